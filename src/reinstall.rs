//! Reinstall orchestration
//!
//! One run is a forward-only chain of stages. The driver owns the current
//! stage, every transition is validated, and each step returns a `Result`
//! instead of relying on thrown-and-caught control flow. Subprocess failures
//! park the machine in `Failed` and are folded into the run outcome so the
//! caller can report them without treating the run as a crash.
//!
//! Stage flow:
//!
//! ```text
//! Idle -> EnsureScanner -> CommandGenerated -> Backup -> RemovePackages
//!      -> NativeInstall -> ScannerInstall -> Done
//!      (any stage can move to Failed)
//! ```

use std::fmt;
use std::path::PathBuf;

use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::backup::{self, Backup};
use crate::context::RunContext;
use crate::error::{RechainError, Result};
use crate::manager::{self, PackageManager};
use crate::manifest::{self, Dependency};
use crate::prompt;
use crate::runner::{self, CommandSpec};
use crate::scanner;

/// Stages of one reinstall run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing has happened yet
    Idle,
    /// Probe the scanner wrapper, bootstrap it when missing
    EnsureScanner,
    /// Build the install command and persist it to `install-command.txt`
    CommandGenerated,
    /// Copy manifest/lockfiles and relocate `node_modules` (gated on
    /// user confirmation, as is everything after it)
    Backup,
    /// Remove every currently-declared dependency
    RemovePackages,
    /// Plain native install
    NativeInstall,
    /// Scanner-wrapped install of the generated command
    ScannerInstall,
    /// Terminal: every stage completed
    Done,
    /// Terminal: a step failed and the chain stopped
    Failed,
}

impl Stage {
    /// The next stage in the chain, or None at a terminal stage.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::EnsureScanner),
            Self::EnsureScanner => Some(Self::CommandGenerated),
            Self::CommandGenerated => Some(Self::Backup),
            Self::Backup => Some(Self::RemovePackages),
            Self::RemovePackages => Some(Self::NativeInstall),
            Self::NativeInstall => Some(Self::ScannerInstall),
            Self::ScannerInstall => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Idle => "waiting to start",
            Self::EnsureScanner => "checking the safe-chain scanner",
            Self::CommandGenerated => "generating the install command",
            Self::Backup => "backing up project files",
            Self::RemovePackages => "removing declared packages",
            Self::NativeInstall => "running the native install",
            Self::ScannerInstall => "reinstalling through safe-chain",
            Self::Done => "reinstall complete",
            Self::Failed => "reinstall failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// How a reinstall run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every stage completed; the backup is kept for manual recovery.
    Completed { backup: Backup },
    /// User declined the confirmation; the command file is left for
    /// manual use.
    Skipped { command_path: PathBuf },
    /// The user cancelled a prompt or the cancel token was observed.
    Interrupted,
    /// A step failed and the chain stopped. `backup` is present when the
    /// failure happened after project files were already touched.
    Failed {
        stage: Stage,
        error: RechainError,
        backup: Option<Backup>,
    },
}

/// Drives one reinstall run through the stage chain.
pub struct Reinstaller<'a> {
    ctx: &'a RunContext,
    pm: PackageManager,
    install_spec: CommandSpec,
    remove_base: CommandSpec,
    native_spec: CommandSpec,
    stage: Stage,
    backup: Option<Backup>,
}

impl<'a> Reinstaller<'a> {
    pub fn new(ctx: &'a RunContext, pm: PackageManager, deps: &[Dependency]) -> Self {
        Self {
            ctx,
            pm,
            install_spec: scanner::safe_chain_cmd(pm, deps),
            remove_base: CommandSpec::new(pm.command()).arg(pm.remove_subcommand()),
            native_spec: CommandSpec::new(pm.command()).arg("install"),
            stage: Stage::Idle,
            backup: None,
        }
    }

    /// Swap the step commands for stand-ins. The removal command still gets
    /// the declared names appended at execution time.
    #[cfg(test)]
    fn with_step_commands(
        mut self,
        remove: CommandSpec,
        native: CommandSpec,
        wrapped: CommandSpec,
    ) -> Self {
        self.remove_base = remove;
        self.native_spec = native;
        self.install_spec = wrapped;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The scanner-wrapped install command this run generated.
    pub fn install_command(&self) -> &CommandSpec {
        &self.install_spec
    }

    /// Move to `stage`, which must be the immediate successor.
    fn enter(&mut self, stage: Stage) -> Result<()> {
        if self.stage.next() != Some(stage) {
            return Err(RechainError::state(format!(
                "Cannot move from \"{}\" to \"{}\"",
                self.stage, stage
            )));
        }
        debug!("Stage: {} -> {}", self.stage, stage);
        self.stage = stage;
        Ok(())
    }

    /// Idle through CommandGenerated: scanner bootstrap plus the command
    /// file. Runs before the confirmation gate and mutates nothing in the
    /// project itself.
    pub fn prepare(&mut self) -> Result<PathBuf> {
        self.enter(Stage::EnsureScanner)?;
        let spinner = prompt::step_spinner("Checking the safe-chain scanner...");
        let ensured = scanner::ensure_scanner(self.ctx, self.pm);
        spinner.finish_and_clear();
        ensured?;

        self.enter(Stage::CommandGenerated)?;
        scanner::write_install_command(self.ctx.dir(), &self.install_spec)
    }

    /// Backup through Done: the gated, mutating half of the chain.
    pub fn execute(&mut self) -> Result<Backup> {
        self.enter(Stage::Backup)?;
        self.ctx.cancel_token().check()?;
        let backup = backup::create_backup(self.ctx.dir())
            .map_err(|e| RechainError::backup(format!("{:#}", e)))?;
        info!("Backup created at {}", backup.path().display());
        self.backup = Some(backup);

        self.enter(Stage::RemovePackages)?;
        let names = manifest::declared_names(self.ctx.dir())?;
        if names.is_empty() {
            debug!("Nothing declared to remove, skipping removal");
        } else {
            let remove = self.remove_base.clone().args(names);
            self.run_step("Removing declared packages...", &remove)?;
        }

        self.enter(Stage::NativeInstall)?;
        let install = self.native_spec.clone();
        self.run_step("Running the native install...", &install)?;

        self.enter(Stage::ScannerInstall)?;
        let wrapped = self.install_spec.clone();
        self.run_step("Reinstalling through safe-chain...", &wrapped)?;

        self.enter(Stage::Done)?;
        info!("Reinstall complete");
        self.backup
            .clone()
            .ok_or_else(|| RechainError::state("Backup record missing after a completed run"))
    }

    fn run_step(&self, message: &'static str, spec: &CommandSpec) -> Result<()> {
        let spinner = prompt::step_spinner(message);
        let result = runner::run_checked(self.ctx, spec);
        spinner.finish_and_clear();
        result
    }

    /// Park the machine in `Failed` and fold the error into an outcome.
    ///
    /// Cancellations are not failures: an `Interrupted` error, or any error
    /// surfacing while the token is set (a Ctrl-C usually kills the child
    /// too), reports as `Interrupted`.
    pub fn fail(mut self, error: RechainError) -> RunOutcome {
        if error.is_interrupted() || self.ctx.cancel_token().is_cancelled() {
            info!("Run interrupted during {}", self.stage);
            return RunOutcome::Interrupted;
        }
        warn!("Run failed during {}: {}", self.stage, error);
        let stage = self.stage;
        self.stage = Stage::Failed;
        RunOutcome::Failed {
            stage,
            error,
            backup: self.backup.take(),
        }
    }
}

/// The full interactive run: detect, choose, read, reinstall.
///
/// Subprocess failures come back inside `RunOutcome::Failed` rather than as
/// errors; only precondition and environment problems use the `Err` channel.
pub fn run(ctx: &RunContext) -> Result<RunOutcome> {
    let detected = manager::detect_or_default(ctx.dir());
    let installed: Vec<(PackageManager, bool)> = PackageManager::iter()
        .map(|pm| (pm, pm.is_installed()))
        .collect();

    let Some(pm) = prompt::select_manager(detected, &installed)? else {
        return Ok(RunOutcome::Interrupted);
    };
    debug!("Using {}", pm);

    let deps = manifest::read_dependencies(ctx.dir())?;
    if deps.is_empty() {
        return Err(RechainError::precondition(format!(
            "No dependencies found in {}. Nothing to reinstall.",
            manifest::MANIFEST_FILE
        )));
    }
    info!("Found {} declared dependencies", deps.len());

    let mut reinstaller = Reinstaller::new(ctx, pm, &deps);
    let command_path = match reinstaller.prepare() {
        Ok(path) => path,
        Err(error) => return Ok(reinstaller.fail(error)),
    };

    let Some(confirmed) = prompt::confirm("Back up and reinstall through safe-chain now?")? else {
        return Ok(RunOutcome::Interrupted);
    };
    if !confirmed {
        return Ok(RunOutcome::Skipped { command_path });
    }

    match reinstaller.execute() {
        Ok(backup) => Ok(RunOutcome::Completed { backup }),
        Err(error) => Ok(reinstaller.fail(error)),
    }
}
