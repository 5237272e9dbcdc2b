use time::OffsetDateTime;

/// One commit (git) or submitted changelist (p4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogItem {
    pub hash: String,
    pub timestamp: OffsetDateTime,
    pub message: String,
}

impl LogItem {
    pub fn new(hash: impl Into<String>, timestamp: OffsetDateTime, message: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            timestamp,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogItems(Vec<LogItem>);

impl LogItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: LogItem) {
        self.0.push(item);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogItem> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[LogItem] {
        &self.0
    }

    /// Stable ascending sort on timestamp.
    pub fn sort_by_date(&mut self) {
        self.0.sort_by_key(|item| item.timestamp);
    }
}

impl From<Vec<LogItem>> for LogItems {
    fn from(items: Vec<LogItem>) -> Self {
        Self(items)
    }
}

impl FromIterator<LogItem> for LogItems {
    fn from_iter<I: IntoIterator<Item = LogItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for LogItems {
    type Item = LogItem;
    type IntoIter = std::vec::IntoIter<LogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LogItems {
    type Item = &'a LogItem;
    type IntoIter = std::slice::Iter<'a, LogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64, message: &str) -> LogItem {
        let timestamp = OffsetDateTime::from_unix_timestamp(seconds).unwrap();
        LogItem::new(format!("hash-{message}"), timestamp, message)
    }

    fn messages(items: &LogItems) -> Vec<&str> {
        items.iter().map(|item| item.message.as_str()).collect()
    }

    #[test]
    fn sort_by_date_orders_ascending() {
        let mut items = LogItems::from(vec![at(300, "c"), at(100, "a"), at(200, "b")]);
        items.sort_by_date();
        assert_eq!(messages(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_by_date_keeps_order_of_equal_timestamps() {
        let mut items = LogItems::from(vec![at(200, "x"), at(100, "first"), at(200, "y")]);
        items.sort_by_date();
        assert_eq!(messages(&items), vec!["first", "x", "y"]);
    }

    #[test]
    fn sort_by_date_is_idempotent_on_sorted_input() {
        let mut items = LogItems::from(vec![at(1, "a"), at(2, "b"), at(3, "c")]);
        let before = items.clone();
        items.sort_by_date();
        assert_eq!(items, before);
    }

    #[test]
    fn sort_by_date_is_non_decreasing_for_every_permutation() {
        let base = [at(5, "a"), at(1, "b"), at(3, "c"), at(3, "d")];
        let permutations = [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];
        for order in permutations {
            let mut items: LogItems = order.iter().map(|&i| base[i].clone()).collect();
            items.sort_by_date();
            let stamps: Vec<_> = items.iter().map(|item| item.timestamp).collect();
            assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }
}
