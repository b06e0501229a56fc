use assert_cmd::prelude::*;
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn init_git_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "core.safecrlf", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
}

/// Write `content` to `name` and commit it as `author` on `date`.
fn commit_file(dir: &Path, name: &str, content: &str, author: (&str, &str), date: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();

    git(dir, &["add", "."]);
    let stamp = format!("{date}T12:00:00+0000");
    assert!(Command::new("git")
        .args(["commit", "-m", &format!("edit {name}")])
        .env("GIT_AUTHOR_NAME", author.0)
        .env("GIT_AUTHOR_EMAIL", author.1)
        .env("GIT_AUTHOR_DATE", &stamp)
        .env("GIT_COMMITTER_DATE", &stamp)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

const ALICE: (&str, &str) = ("Alice", "alice@example.com");
const BOB: (&str, &str) = ("Bob", "bob@example.com");

fn sample_repo(dir: &Path) {
    init_git_repo(dir);
    commit_file(dir, "src/a.py", "a\nb\nc\n", ALICE, "2018-03-01");
    commit_file(dir, "src/a.py", "a\nB\nc\nd\n", BOB, "2018-03-01");
    commit_file(dir, "docs/notes.md", "one\ntwo\n", ALICE, "2018-05-20");
    commit_file(dir, "src/b.py", "x\n", ALICE, "2019-01-02");
}

fn csv_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn report_writes_sorted_csv_for_the_year() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let repo = dir.path().join("sample");
    fs::create_dir_all(&repo).unwrap();
    sample_repo(&repo);
    let out = dir.path().join("stats.csv");

    Command::cargo_bin("linetally")
        .unwrap()
        .arg("--repo")
        .arg(format!("demo={}", repo.display()))
        .args(["--year", "2018", "report", "--out"])
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        csv_lines(&out),
        vec![
            "Author,Date,Repository,Lines added,Lines deleted",
            "Alice,2018-03-01,demo,3,0",
            "Bob,2018-03-01,demo,2,1",
            "Alice,2018-05-20,demo,2,0",
        ]
    );
}

#[test]
fn excluded_files_do_not_count() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    sample_repo(dir.path());

    let output = Command::cargo_bin("linetally")
        .unwrap()
        .arg("--repo")
        .arg(dir.path())
        .args(["--exclude", "^docs/", "--since", "2018-01-01", "report", "--ndjson"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let rows: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let dates: Vec<&str> = rows.iter().map(|r| r["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec!["2018-03-01", "2018-03-01", "2019-01-02"]);
}

#[test]
fn authors_json_totals() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    sample_repo(dir.path());

    let out = Command::cargo_bin("linetally")
        .unwrap()
        .arg("--repo")
        .arg(format!("demo={}", dir.path().display()))
        .args(["authors", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let entries = v["entries"].as_array().unwrap();
    let alice = entries.iter().find(|e| e["author"] == "Alice").unwrap();
    assert_eq!(alice["commits"], 3);
    assert_eq!(alice["insertions"], 6);
    assert_eq!(alice["email"], "alice@example.com");
    assert_eq!(alice["repository"], "demo");
}

#[test]
fn failing_repository_is_reported_but_others_are_written() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    let repo = dir.path().join("good");
    fs::create_dir_all(&repo).unwrap();
    sample_repo(&repo);
    let missing = dir.path().join("missing");
    let out = dir.path().join("stats.csv");

    Command::cargo_bin("linetally")
        .unwrap()
        .arg("--repo")
        .arg(&missing)
        .arg("--repo")
        .arg(&repo)
        .args(["report", "--out"])
        .arg(&out)
        .assert()
        .failure();

    let lines = csv_lines(&out);
    assert_eq!(lines.len(), 5);
    assert!(lines[1..].iter().all(|l| l.contains(",good,")));
}

#[test]
fn invalid_exclusion_rule_fails_before_running() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("stats.csv");
    Command::cargo_bin("linetally")
        .unwrap()
        .args(["--exclude", "author:[", "report", "--out"])
        .arg(&out)
        .assert()
        .failure();
    assert!(!out.exists());
}
