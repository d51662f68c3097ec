//! Pre-install backups
//!
//! Snapshots the manifest and every known lockfile into a fresh timestamped
//! directory and relocates `node_modules` into it. The backup is an artifact
//! for manual recovery and is never cleaned up automatically.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::debug;

use crate::manager;
use crate::manifest::MANIFEST_FILE;

/// Manager-populated directory holding installed package contents.
/// Relocated into the backup with a rename, never copied.
pub const CACHE_DIR: &str = "node_modules";

/// What one backup run produced.
#[derive(Debug, Clone)]
pub struct Backup {
    path: PathBuf,
    copied: Vec<String>,
    relocated_cache: bool,
}

impl Backup {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File names copied into the backup, in backup order.
    pub fn copied(&self) -> &[String] {
        &self.copied
    }

    /// Whether `node_modules` existed and was moved into the backup.
    pub fn relocated_cache(&self) -> bool {
        self.relocated_cache
    }
}

/// Create the timestamped backup directory inside `dir` and fill it.
///
/// Copies `package.json` plus each lockfile present, then renames
/// `node_modules` into the backup so no copy is left behind.
pub fn create_backup(dir: &Path) -> Result<Backup> {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("safe-chain-backup-{}", stamp));
    fs::create_dir(&path)
        .with_context(|| format!("Failed to create backup directory {}", path.display()))?;

    let mut copied = Vec::new();
    for name in std::iter::once(MANIFEST_FILE).chain(manager::known_lockfiles()) {
        let src = dir.join(name);
        if !src.is_file() {
            continue;
        }
        fs::copy(&src, path.join(name))
            .with_context(|| format!("Failed to copy {} into {}", name, path.display()))?;
        copied.push(name.to_string());
    }

    let cache = dir.join(CACHE_DIR);
    let relocated_cache = cache.is_dir();
    if relocated_cache {
        fs::rename(&cache, path.join(CACHE_DIR))
            .with_context(|| format!("Failed to move {} into {}", CACHE_DIR, path.display()))?;
    }

    debug!(
        "Backed up {:?} to {} (cache relocated: {})",
        copied,
        path.display(),
        relocated_cache
    );
    Ok(Backup {
        path,
        copied,
        relocated_cache,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_of_an_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let backup = create_backup(dir.path()).unwrap();
        assert!(backup.path().is_dir());
        assert!(backup.copied().is_empty());
        assert!(!backup.relocated_cache());
    }

    #[test]
    fn test_backup_copies_manifest_and_lockfiles() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::write(dir.path().join("yarn.lock"), "").unwrap();

        let backup = create_backup(dir.path()).unwrap();
        let copied: Vec<&str> = backup.copied().iter().map(String::as_str).collect();
        assert_eq!(copied, ["package.json", "yarn.lock"]);
        // Copies, not moves: the originals stay in place.
        assert!(dir.path().join("package.json").is_file());
        assert!(dir.path().join("yarn.lock").is_file());
        assert!(backup.path().join("package.json").is_file());
        assert!(backup.path().join("yarn.lock").is_file());
    }

    #[test]
    fn test_backup_relocates_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(CACHE_DIR)).unwrap();
        fs::write(dir.path().join(CACHE_DIR).join("marker.js"), "ok").unwrap();

        let backup = create_backup(dir.path()).unwrap();
        assert!(backup.relocated_cache());
        assert!(!dir.path().join(CACHE_DIR).exists());
        assert!(backup.path().join(CACHE_DIR).join("marker.js").is_file());
    }
}
