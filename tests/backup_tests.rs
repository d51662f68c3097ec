//! Backup tests
//!
//! A backup copies the manifest and every lockfile that exists, then
//! relocates node_modules into the backup directory. Copies leave the
//! originals in place; the relocation does not.

use std::fs;
use std::path::Path;

use rechain::backup;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("failed to write fixture");
}

#[test]
fn test_backup_copies_manifest_and_lockfiles() {
    let dir = tempdir().unwrap();
    write(dir.path(), "package.json", r#"{ "name": "fixture" }"#);
    write(dir.path(), "yarn.lock", "# yarn lockfile v1\n");
    write(dir.path(), "pnpm-lock.yaml", "lockfileVersion: 9\n");

    let backup = backup::create_backup(dir.path()).unwrap();

    let copied: Vec<&str> = backup.copied().iter().map(String::as_str).collect();
    assert_eq!(copied, ["package.json", "pnpm-lock.yaml", "yarn.lock"]);
    for name in &copied {
        assert_eq!(
            fs::read_to_string(dir.path().join(name)).unwrap(),
            fs::read_to_string(backup.path().join(name)).unwrap(),
            "{} should be copied byte for byte",
            name
        );
    }
}

#[test]
fn test_backup_leaves_the_originals_in_place() {
    let dir = tempdir().unwrap();
    write(dir.path(), "package.json", "{}");
    write(dir.path(), "package-lock.json", "{}");

    backup::create_backup(dir.path()).unwrap();

    assert!(dir.path().join("package.json").exists());
    assert!(dir.path().join("package-lock.json").exists());
}

#[test]
fn test_backup_relocates_node_modules_without_leaving_a_copy() {
    let dir = tempdir().unwrap();
    write(dir.path(), "package.json", "{}");
    let nested = dir.path().join("node_modules").join("a").join("dist");
    fs::create_dir_all(&nested).unwrap();
    write(&nested, "index.js", "module.exports = 1;\n");

    let backup = backup::create_backup(dir.path()).unwrap();

    assert!(backup.relocated_cache());
    assert!(!dir.path().join("node_modules").exists());
    let moved = backup.path().join("node_modules").join("a").join("dist");
    assert_eq!(
        fs::read_to_string(moved.join("index.js")).unwrap(),
        "module.exports = 1;\n"
    );
}

#[test]
fn test_backup_without_node_modules_records_nothing_relocated() {
    let dir = tempdir().unwrap();
    write(dir.path(), "package.json", "{}");

    let backup = backup::create_backup(dir.path()).unwrap();

    assert!(!backup.relocated_cache());
    assert!(!backup.path().join("node_modules").exists());
}

#[test]
fn test_backup_directory_is_timestamped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "package.json", "{}");

    let backup = backup::create_backup(dir.path()).unwrap();

    let name = backup
        .path()
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap()
        .to_string();
    assert!(
        name.starts_with("safe-chain-backup-"),
        "unexpected backup dir name: {}",
        name
    );
    assert!(backup.path().parent().unwrap() == dir.path());
}

#[test]
fn test_backup_of_an_empty_project_still_creates_the_directory() {
    let dir = tempdir().unwrap();

    let backup = backup::create_backup(dir.path()).unwrap();

    assert!(backup.path().is_dir());
    assert!(backup.copied().is_empty());
    assert!(!backup.relocated_cache());
}
