use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_huff_and_puff_round_trip() {
    let temp = tempdir().unwrap();
    let original = temp.path().join("story.txt");
    let text = "It was the best of times, it was the worst of times.\n".repeat(50);
    fs::write(&original, &text).unwrap();

    Command::cargo_bin("huffproc")
        .unwrap()
        .arg("huff")
        .arg(&original)
        .assert()
        .success();

    let compressed = temp.path().join("story.txt.huff");
    assert!(compressed.exists());

    Command::cargo_bin("huffproc")
        .unwrap()
        .arg("puff")
        .arg(&compressed)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(temp.path().join("out_story.txt")).unwrap(), text);
}

#[test]
fn test_output_flag() {
    let temp = tempdir().unwrap();
    let original = temp.path().join("data.bin");
    fs::write(&original, (0..=255u8).collect::<Vec<_>>()).unwrap();
    let packed = temp.path().join("packed");
    let restored = temp.path().join("restored");

    Command::cargo_bin("huffproc")
        .unwrap()
        .args(["huff", "-o"])
        .arg(&packed)
        .arg(&original)
        .assert()
        .success();

    Command::cargo_bin("huffproc")
        .unwrap()
        .args(["puff", "--output"])
        .arg(&restored)
        .arg(&packed)
        .assert()
        .success();

    assert_eq!(fs::read(&restored).unwrap(), fs::read(&original).unwrap());
}

#[test]
fn test_debug_summary_on_stderr() {
    let temp = tempdir().unwrap();
    let original = temp.path().join("aaaa");
    fs::write(&original, "aaaa").unwrap();

    Command::cargo_bin("huffproc")
        .unwrap()
        .args(["--debug", "low", "huff"])
        .arg(&original)
        .assert()
        .success()
        .stderr(predicate::str::contains("bits written"));
}

#[test]
fn test_puff_rejects_bad_magic() {
    let temp = tempdir().unwrap();
    let bogus = temp.path().join("bogus.huff");
    fs::write(&bogus, "plain text, not a huff stream").unwrap();

    Command::cargo_bin("huffproc")
        .unwrap()
        .arg("puff")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid magic number"));

    assert!(!temp.path().join("out_bogus").exists());
}

#[test]
fn test_unknown_command() {
    Command::cargo_bin("huffproc")
        .unwrap()
        .args(["zip", "file"])
        .assert()
        .failure();
}

#[test]
fn test_missing_file() {
    let temp = tempdir().unwrap();

    Command::cargo_bin("huffproc")
        .unwrap()
        .arg("huff")
        .arg(temp.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Application error"));
}
