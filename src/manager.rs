//! Package manager detection and capabilities
//!
//! The four supported managers are modeled as one enum; detection walks the
//! variants in declaration order (pnpm, yarn, npm, bun) and returns the first
//! whose lockfile exists in the project directory, defaulting to npm.

use std::path::Path;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

use crate::runner;

/// A supported JavaScript package manager.
///
/// Variant order is the lockfile detection priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PackageManager {
    Pnpm,
    Yarn,
    #[default]
    Npm,
    Bun,
}

impl PackageManager {
    /// Lockfiles this manager may leave in a project, in recognition order.
    pub const fn lockfiles(self) -> &'static [&'static str] {
        match self {
            Self::Pnpm => &["pnpm-lock.yaml"],
            Self::Yarn => &["yarn.lock"],
            Self::Npm => &["package-lock.json"],
            Self::Bun => &["bun.lockb", "bun.lock"],
        }
    }

    /// Binary name used for native subcommands.
    pub const fn command(self) -> &'static str {
        match self {
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Npm => "npm",
            Self::Bun => "bun",
        }
    }

    /// The safe-chain wrapper binary for this manager.
    pub fn scanner_command(self) -> String {
        format!("aikido-{}", self.command())
    }

    /// Subcommand that adds the listed packages (`npm install a@1.0.0`,
    /// `yarn add a@1.0.0`).
    pub const fn add_subcommand(self) -> &'static str {
        match self {
            Self::Npm => "install",
            Self::Pnpm | Self::Yarn | Self::Bun => "add",
        }
    }

    /// Subcommand that removes declared packages. Every supported manager
    /// accepts `remove` (npm as an alias of `uninstall`).
    pub const fn remove_subcommand(self) -> &'static str {
        "remove"
    }

    /// First of this manager's lockfiles present in `dir`, if any.
    pub fn lockfile_in(self, dir: &Path) -> Option<&'static str> {
        self.lockfiles()
            .iter()
            .copied()
            .find(|name| dir.join(name).is_file())
    }

    /// Whether the manager binary responds to a version query.
    ///
    /// Non-zero exit and spawn failure both count as "not installed"; this
    /// only disables the choice in the selection prompt, nothing fatal.
    pub fn is_installed(self) -> bool {
        runner::probe(self.command(), "--version")
    }
}

/// Every lockfile name any supported manager can leave behind.
pub fn known_lockfiles() -> impl Iterator<Item = &'static str> {
    PackageManager::iter().flat_map(|pm| pm.lockfiles().iter().copied())
}

/// First manager whose lockfile is present in `dir`, in priority order.
pub fn detect(dir: &Path) -> Option<PackageManager> {
    PackageManager::iter().find(|pm| pm.lockfile_in(dir).is_some())
}

/// Detected manager, or npm when no lockfile gives a signal.
pub fn detect_or_default(dir: &Path) -> PackageManager {
    match detect(dir) {
        Some(pm) => {
            debug!("Detected {} via {:?}", pm, pm.lockfile_in(dir));
            pm
        }
        None => {
            debug!("No lockfile found, defaulting to {}", PackageManager::default());
            PackageManager::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_display_names_match_binaries() {
        for pm in PackageManager::iter() {
            assert_eq!(pm.to_string(), pm.command());
        }
    }

    #[test]
    fn test_default_is_npm() {
        assert_eq!(PackageManager::default(), PackageManager::Npm);
    }

    #[test]
    fn test_add_subcommand_mapping() {
        assert_eq!(PackageManager::Npm.add_subcommand(), "install");
        assert_eq!(PackageManager::Pnpm.add_subcommand(), "add");
        assert_eq!(PackageManager::Yarn.add_subcommand(), "add");
        assert_eq!(PackageManager::Bun.add_subcommand(), "add");
    }

    #[test]
    fn test_scanner_command_names() {
        assert_eq!(PackageManager::Npm.scanner_command(), "aikido-npm");
        assert_eq!(PackageManager::Bun.scanner_command(), "aikido-bun");
    }

    #[test]
    fn test_detect_returns_none_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect(dir.path()), None);
        assert_eq!(detect_or_default(dir.path()), PackageManager::Npm);
    }

    #[test]
    fn test_detect_prefers_pnpm_over_everything() {
        let dir = tempfile::tempdir().unwrap();
        for name in known_lockfiles() {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        assert_eq!(detect(dir.path()), Some(PackageManager::Pnpm));
    }

    #[test]
    fn test_detect_recognizes_both_bun_lockfiles() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bun.lockb"), "").unwrap();
        assert_eq!(detect(dir.path()), Some(PackageManager::Bun));
        fs::remove_file(dir.path().join("bun.lockb")).unwrap();
        fs::write(dir.path().join("bun.lock"), "{}").unwrap();
        assert_eq!(detect(dir.path()), Some(PackageManager::Bun));
    }

    #[test]
    fn test_known_lockfiles_has_no_duplicates() {
        let names: Vec<_> = known_lockfiles().collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }
}
