use std::fs;

use harvester_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_content() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("checkpoint.json");
    let writer = AtomicFileWriter::new(target.clone());

    writer.write(b"first").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "first");

    writer.write(b"second").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "second");

    // Only the target remains; temp files were renamed into place.
    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn write_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("out").join("records.json");
    AtomicFileWriter::new(target.clone()).write(b"[]").unwrap();
    assert_eq!(fs::read(&target).unwrap(), b"[]");
}

#[test]
fn read_missing_file_is_none() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("absent.json"));
    assert!(writer.read().unwrap().is_none());
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let writer = AtomicFileWriter::new(blocker.join("doc.json"));
    assert!(writer.write(b"data").is_err());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
