//! Aikido safe-chain scanner integration
//!
//! Builds the scanner-wrapped install command, persists it for manual use,
//! and bootstraps the scanner package when its wrapper binary is missing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::context::RunContext;
use crate::error::Result;
use crate::manager::PackageManager;
use crate::manifest::Dependency;
use crate::runner::{self, CommandSpec};

/// Package that provides the `aikido-*` wrapper binaries.
pub const SCANNER_PACKAGE: &str = "@aikidosec/safe-chain";
/// File the generated install command is persisted to, overwritten each run.
pub const COMMAND_FILE: &str = "install-command.txt";

/// The scanner-wrapped install command for this manager and dependency list,
/// e.g. `aikido-npm install a@1.0.0 b@2.0.0`.
pub fn safe_chain_cmd(pm: PackageManager, deps: &[Dependency]) -> CommandSpec {
    CommandSpec::new(pm.scanner_command())
        .arg(pm.add_subcommand())
        .args(deps.iter().map(ToString::to_string))
}

/// Write the install command to `install-command.txt` in `dir`.
pub fn write_install_command(dir: &Path, spec: &CommandSpec) -> Result<PathBuf> {
    let path = dir.join(COMMAND_FILE);
    fs::write(&path, format!("{}\n", spec))?;
    debug!("Wrote install command to {}", path.display());
    Ok(path)
}

/// Command that installs the scanner package through this manager.
///
/// Always a global install: that is how the wrapper binaries are
/// distributed, and it leaves the project manifest untouched.
pub fn bootstrap_cmd(pm: PackageManager) -> CommandSpec {
    let spec = CommandSpec::new(pm.command());
    match pm {
        PackageManager::Npm => spec.args(["install", "--global", SCANNER_PACKAGE]),
        PackageManager::Pnpm => spec.args(["add", "--global", SCANNER_PACKAGE]),
        PackageManager::Yarn => spec.args(["global", "add", SCANNER_PACKAGE]),
        PackageManager::Bun => spec.args(["add", "--global", SCANNER_PACKAGE]),
    }
}

/// Make sure the scanner wrapper responds, bootstrapping it if not.
pub fn ensure_scanner(ctx: &RunContext, pm: PackageManager) -> Result<()> {
    let wrapper = pm.scanner_command();
    if runner::probe(&wrapper, "--version") {
        debug!("{} is already available", wrapper);
        return Ok(());
    }
    info!("{} not found, installing {}", wrapper, SCANNER_PACKAGE);
    runner::run_checked(ctx, &bootstrap_cmd(pm))
}
