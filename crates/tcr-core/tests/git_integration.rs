use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tcr_core::{GitBackend, Vcs, VcsConfig, VcsError};
use tempfile::TempDir;

fn git_cli(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn init_repo(dir: &Path) -> PathBuf {
    git_cli(dir, &["init", "--quiet"]);
    git_cli(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git_cli(dir, &["config", "user.name", "tcr"]);
    git_cli(dir, &["config", "user.email", "tcr@example.com"]);
    git_cli(dir, &["config", "commit.gpgsign", "false"]);
    dir.canonicalize().unwrap()
}

fn repo_with_commit(temp: &TempDir) -> (PathBuf, GitBackend) {
    let root = init_repo(temp.path());
    fs::write(root.join("hello.txt"), "one\ntwo\nthree\n").unwrap();
    let git = GitBackend::open(&root, &VcsConfig::default()).expect("open");
    git.add(&[]).expect("add");
    git.commit(false, &["initial commit".to_string()])
        .expect("commit");
    (root, git)
}

#[test]
fn open_on_fresh_repository_resolves_unborn_branch() {
    let temp = TempDir::new().unwrap();
    let root = init_repo(temp.path());

    let git = GitBackend::open(&root, &VcsConfig::default()).expect("open");
    assert_eq!(git.root_dir(), root.as_path());
    assert_eq!(git.working_branch(), "main");
    assert!(git.is_on_root_branch());
    assert!(!git.is_remote_enabled());
    assert!(!git.check_remote_access());
    assert_eq!(git.session_summary(), "git branch \"main\"");
}

#[test]
fn open_from_subdirectory_finds_repository_root() {
    let temp = TempDir::new().unwrap();
    let root = init_repo(temp.path());
    let sub = root.join("src").join("deep");
    fs::create_dir_all(&sub).unwrap();

    let git = GitBackend::open(&sub, &VcsConfig::default()).expect("open");
    assert_eq!(git.root_dir(), root.as_path());
}

#[test]
fn open_outside_repository_fails() {
    let temp = TempDir::new().unwrap();
    let result = GitBackend::open(temp.path(), &VcsConfig::default());
    assert!(matches!(result, Err(VcsError::NotARepository(_))));
}

#[test]
fn diff_reports_changed_lines_against_head() {
    let temp = TempDir::new().unwrap();
    let (root, git) = repo_with_commit(&temp);
    assert!(git.diff().unwrap().is_empty());

    fs::write(root.join("hello.txt"), "one\n2\nthree\nfour\n").unwrap();
    let diffs = git.diff().unwrap();
    assert_eq!(diffs.len(), 1);
    let diff = &diffs.as_slice()[0];
    assert_eq!(diff.path, root.join("hello.txt"));
    assert_eq!(diff.added_lines, 2);
    assert_eq!(diff.removed_lines, 1);
    assert_eq!(diffs.changed_lines(None), 3);
}

#[test]
fn commit_with_nothing_to_commit_succeeds() {
    let temp = TempDir::new().unwrap();
    let (_root, git) = repo_with_commit(&temp);
    git.commit(false, &["empty".to_string()])
        .expect("nothing to commit is not an error");
    assert_eq!(git.log(None).unwrap().len(), 1);
}

#[test]
fn commit_messages_become_paragraphs() {
    let temp = TempDir::new().unwrap();
    let (root, git) = repo_with_commit(&temp);
    fs::write(root.join("hello.txt"), "changed\n").unwrap();
    git.add(&[PathBuf::from("hello.txt")]).unwrap();
    git.commit(false, &["header".to_string(), "body".to_string()])
        .unwrap();

    let message = git_cli(&root, &["log", "-1", "--format=%B"]);
    assert_eq!(message.trim_end(), "header\n\nbody");
}

#[test]
fn amend_rewrites_last_commit() {
    let temp = TempDir::new().unwrap();
    let (root, git) = repo_with_commit(&temp);
    fs::write(root.join("other.txt"), "x\n").unwrap();
    git.add(&[]).unwrap();
    git.commit(true, &["amended".to_string()]).unwrap();

    let log = git.log(None).unwrap();
    assert_eq!(log.len(), 1);
    assert!(log.as_slice()[0].message.starts_with("amended"));
}

#[test]
fn log_lists_commits_and_applies_filter() {
    let temp = TempDir::new().unwrap();
    let (root, git) = repo_with_commit(&temp);
    fs::write(root.join("hello.txt"), "more\n").unwrap();
    git.add(&[]).unwrap();
    git.commit(false, &["✅ TCR - tests passing".to_string()])
        .unwrap();

    let all = git.log(None).unwrap();
    assert_eq!(all.len(), 2);
    for item in all.iter() {
        assert_eq!(item.hash.len(), 40);
    }

    let passing: &dyn Fn(&str) -> bool = &|msg: &str| msg.contains("tests passing");
    let filtered = git.log(Some(passing)).unwrap();
    assert_eq!(filtered.len(), 1);
    assert!(filtered.as_slice()[0].message.starts_with("✅ TCR"));

    let head = git_cli(&root, &["rev-parse", "HEAD"]);
    assert_eq!(filtered.as_slice()[0].hash, head.trim());
}

#[test]
fn restore_discards_local_changes() {
    let temp = TempDir::new().unwrap();
    let (root, git) = repo_with_commit(&temp);
    let file = root.join("hello.txt");
    fs::write(&file, "scratch\n").unwrap();

    git.restore(&file).unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "one\ntwo\nthree\n");
}

#[test]
fn revert_records_a_new_commit() {
    let temp = TempDir::new().unwrap();
    let (root, git) = repo_with_commit(&temp);
    let file = root.join("hello.txt");
    fs::write(&file, "broken\n").unwrap();
    git.add(&[]).unwrap();
    git.commit(false, &["break it".to_string()]).unwrap();

    git.revert().unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "one\ntwo\nthree\n");
    assert_eq!(git.log(None).unwrap().len(), 3);

    git.rollback_last_commit().unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "broken\n");
}

#[test]
fn stash_and_unstash_round_trip_local_changes() {
    let temp = TempDir::new().unwrap();
    let (root, git) = repo_with_commit(&temp);
    let file = root.join("hello.txt");
    fs::write(&file, "work in progress\n").unwrap();
    fs::write(root.join("new.txt"), "untracked\n").unwrap();

    git.stash("tcr stash").unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "one\ntwo\nthree\n");
    assert!(!root.join("new.txt").exists());

    git.unstash(true).unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "work in progress\n");
    assert!(git_cli(&root, &["stash", "list"]).contains("tcr stash"));

    git.restore(&file).unwrap();
    fs::remove_file(root.join("new.txt")).unwrap();
    git.unstash(false).unwrap();
    assert!(git_cli(&root, &["stash", "list"]).trim().is_empty());
}

#[test]
fn unstash_without_stash_fails() {
    let temp = TempDir::new().unwrap();
    let (_root, git) = repo_with_commit(&temp);
    assert!(git.unstash(false).is_err());
}

#[test]
fn push_and_pull_through_a_bare_remote() {
    let temp = TempDir::new().unwrap();
    let remote = temp.path().join("remote.git");
    fs::create_dir_all(&remote).unwrap();
    git_cli(&remote, &["init", "--quiet", "--bare"]);

    let work = temp.path().join("work");
    fs::create_dir_all(&work).unwrap();
    let root = init_repo(&work);
    git_cli(&root, &["remote", "add", "origin", remote.to_str().unwrap()]);
    fs::write(root.join("hello.txt"), "one\n").unwrap();
    git_cli(&root, &["add", "."]);
    git_cli(&root, &["commit", "--quiet", "-m", "initial"]);

    let mut vcs = GitBackend::open(&root, &VcsConfig::default()).expect("open");
    assert!(vcs.is_remote_enabled());
    assert_eq!(vcs.remote_name(), "origin");
    assert!(!vcs.working_branch_exists_on_remote());
    vcs.pull().expect("pull is skipped before the branch exists remotely");

    vcs.push().expect("push");
    assert!(vcs.working_branch_exists_on_remote());
    assert!(git_cli(&remote, &["branch", "--list", "main"]).contains("main"));

    let reopened = GitBackend::open(&root, &VcsConfig::default()).expect("reopen");
    assert!(reopened.working_branch_exists_on_remote());
    assert!(reopened.check_remote_access());
    reopened.pull().expect("pull");
}

#[test]
fn configured_remote_that_does_not_exist_disables_remote() {
    let temp = TempDir::new().unwrap();
    let (_root, _git) = repo_with_commit(&temp);
    let config = VcsConfig {
        remote_name: "upstream".to_string(),
        ..VcsConfig::default()
    };
    let mut git = GitBackend::open(temp.path(), &config).expect("open");
    assert!(!git.is_remote_enabled());
    assert_eq!(git.remote_name(), "");
    git.push().expect("push without remote is a no-op");
}
