//! rechain library
//!
//! Core functionality for backing up a JavaScript project and reinstalling
//! its dependencies through the Aikido safe-chain scanner.

pub mod backup;
pub mod cli;
pub mod context;
pub mod error;
pub mod manager;
pub mod manifest;
pub mod prompt;
pub mod reinstall;
pub mod runner;
pub mod scanner;

// Re-export the main types for convenience
pub use backup::Backup;
pub use context::{CancelToken, RunContext};
pub use error::{RechainError, Result};
pub use manager::PackageManager;
pub use manifest::Dependency;
pub use reinstall::{Reinstaller, RunOutcome, Stage};
pub use runner::CommandSpec;
