use tracing::debug;

use crate::error::VcsResult;
use crate::process::{CommandRunner, ShellCommand};

/// Environment variable naming an external commit message generator.
pub const MESSAGE_COMMAND_ENV: &str = "TCR_COMMIT_MESSAGE_COMMAND";

/// Produces the lines passed to [`crate::vcs::Vcs::commit`].
pub trait MessageBuilder {
    fn generate_message(&self) -> VcsResult<Vec<String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleMessageBuilder {
    pub header: String,
    pub body: Vec<String>,
    pub suffix: String,
}

impl SimpleMessageBuilder {
    pub fn new(header: impl Into<String>, body: Vec<String>, suffix: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            body,
            suffix: suffix.into(),
        }
    }
}

impl MessageBuilder for SimpleMessageBuilder {
    fn generate_message(&self) -> VcsResult<Vec<String>> {
        let mut lines = Vec::with_capacity(self.body.len() + 2);
        lines.push(self.header.clone());
        lines.extend(self.body.iter().cloned());
        if !self.suffix.is_empty() {
            lines.push(format!("\n{}", self.suffix));
        }
        Ok(lines)
    }
}

/// Runs a user-provided command and uses its output lines as the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalMessageBuilder {
    command: ShellCommand,
}

impl ExternalMessageBuilder {
    pub fn new<I, S>(command_path: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: ShellCommand::with_params(command_path, args),
        }
    }

    /// Builds from a whitespace-separated command line. `None` when blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program, words))
    }

    pub fn command(&self) -> &ShellCommand {
        &self.command
    }
}

impl MessageBuilder for ExternalMessageBuilder {
    fn generate_message(&self) -> VcsResult<Vec<String>> {
        let output = self.command.run(&[])?;
        Ok(String::from_utf8_lossy(&output)
            .lines()
            .map(str::to_string)
            .collect())
    }
}

/// External builder when `TCR_COMMIT_MESSAGE_COMMAND` is set, simple one otherwise.
pub fn message_builder(
    header: &str,
    body: Vec<String>,
    suffix: &str,
) -> Box<dyn MessageBuilder> {
    let configured = std::env::var(MESSAGE_COMMAND_ENV).ok();
    select_builder(configured.as_deref(), header, body, suffix)
}

fn select_builder(
    command_line: Option<&str>,
    header: &str,
    body: Vec<String>,
    suffix: &str,
) -> Box<dyn MessageBuilder> {
    match command_line.and_then(ExternalMessageBuilder::from_command_line) {
        Some(external) => {
            debug!(command = %external.command(), "using external commit message builder");
            Box::new(external)
        }
        None => Box::new(SimpleMessageBuilder::new(header, body, suffix)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_message_with_header_only() {
        let builder = SimpleMessageBuilder::new("commit message header", Vec::new(), "");
        assert_eq!(
            builder.generate_message().unwrap(),
            vec!["commit message header"]
        );
    }

    #[test]
    fn simple_message_with_body_and_suffix() {
        let builder = SimpleMessageBuilder::new(
            "✅ TCR - tests passing",
            vec!["changed-lines: 3".to_string(), "tests: 12".to_string()],
            "my suffix",
        );
        assert_eq!(
            builder.generate_message().unwrap(),
            vec![
                "✅ TCR - tests passing",
                "changed-lines: 3",
                "tests: 12",
                "\nmy suffix"
            ]
        );
    }

    #[test]
    fn command_line_is_split_on_whitespace() {
        let builder = ExternalMessageBuilder::from_command_line("  gen-msg  --short -v ").unwrap();
        assert_eq!(builder.command().name(), "gen-msg");
        assert_eq!(builder.command().params(), &["--short", "-v"]);
        assert!(ExternalMessageBuilder::from_command_line("   ").is_none());
    }

    #[test]
    fn blank_configuration_falls_back_to_simple_builder() {
        let builder = select_builder(Some(" "), "header", Vec::new(), "");
        assert_eq!(builder.generate_message().unwrap(), vec!["header"]);
        let builder = select_builder(None, "header", Vec::new(), "sfx");
        assert_eq!(builder.generate_message().unwrap(), vec!["header", "\nsfx"]);
    }

    #[cfg(unix)]
    #[test]
    fn external_builder_returns_output_lines() {
        let builder = ExternalMessageBuilder::new("echo", ["Hello World!"]);
        assert_eq!(builder.generate_message().unwrap(), vec!["Hello World!"]);

        let builder = ExternalMessageBuilder::new("printf", ["Hello\\nWorld!\\n"]);
        assert_eq!(builder.generate_message().unwrap(), vec!["Hello", "World!"]);
    }

    #[cfg(unix)]
    #[test]
    fn external_builder_with_no_output() {
        let builder = ExternalMessageBuilder::new("true", Vec::<String>::new());
        assert!(builder.generate_message().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn external_builder_failures() {
        let builder = ExternalMessageBuilder::new("tcr-no-such-command", Vec::<String>::new());
        assert!(builder.generate_message().is_err());
        let builder = ExternalMessageBuilder::new("false", Vec::<String>::new());
        assert!(builder.generate_message().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn configured_command_takes_precedence() {
        let builder = select_builder(Some("echo from env"), "header", Vec::new(), "");
        assert_eq!(builder.generate_message().unwrap(), vec!["from env"]);
    }
}
