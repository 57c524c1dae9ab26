//! Binary-level tests: flags, exit codes, and output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn dirsync() -> Command {
    Command::cargo_bin("dirsync").expect("binary built")
}

#[test]
fn test_help_lists_flags() {
    dirsync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--direction"))
        .stdout(predicate::str::contains("--action"))
        .stdout(predicate::str::contains("--test"));
}

#[test]
fn test_missing_path_exits_with_two() {
    let left = TempDir::new().expect("create left");

    dirsync()
        .arg(left.path())
        .arg(left.path().join("missing"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_bad_direction_is_usage_error() {
    let left = TempDir::new().expect("create left");
    let right = TempDir::new().expect("create right");

    dirsync()
        .args(["-d", "sideways"])
        .arg(left.path())
        .arg(right.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("sideways"));
}

#[test]
fn test_dry_run_prints_plan_only() {
    let left = TempDir::new().expect("create left");
    let right = TempDir::new().expect("create right");
    fs::write(left.path().join("x.txt"), b"0123456789").expect("write x");

    dirsync()
        .arg("--test")
        .arg(left.path())
        .arg(right.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Test run"))
        .stdout(predicate::str::contains("x.txt"));

    assert!(!right.path().join("x.txt").exists());
}

#[test]
fn test_yes_copies_without_prompt() {
    let left = TempDir::new().expect("create left");
    let right = TempDir::new().expect("create right");
    fs::write(left.path().join("x.txt"), b"0123456789").expect("write x");

    dirsync()
        .arg("-y")
        .arg(left.path())
        .arg(right.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total size to transfer: 10 B"))
        .stdout(predicate::str::contains("Total size transferred"));

    assert_eq!(
        fs::read(right.path().join("x.txt")).expect("read copy"),
        b"0123456789"
    );
}

#[test]
fn test_up_to_date_message() {
    let left = TempDir::new().expect("create left");
    let right = TempDir::new().expect("create right");

    dirsync()
        .arg(left.path())
        .arg(right.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Folders up to date!"));
}

#[test]
fn test_same_root_twice_is_rejected() {
    let root = TempDir::new().expect("create root");

    dirsync()
        .arg(root.path())
        .arg(root.path())
        .assert()
        .code(2);
}

#[test]
fn test_invalid_prompt_answer_exits_with_two() {
    let left = TempDir::new().expect("create left");
    let right = TempDir::new().expect("create right");
    fs::write(left.path().join("x.txt"), b"x").expect("write x");

    dirsync()
        .arg(left.path())
        .arg(right.path())
        .write_stdin("maybe\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid option."));

    assert!(!right.path().join("x.txt").exists());
}

#[test]
fn test_nested_roots_are_rejected() {
    let left = TempDir::new().expect("create left");
    let right = left.path().join("R");
    fs::create_dir(&right).expect("create nested right");
    fs::write(left.path().join("x.txt"), b"x").expect("write x");

    dirsync()
        .arg("-y")
        .arg(left.path())
        .arg(&right)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nested"));

    assert!(!right.join("R").exists());
}
