//! rechain - main entry point
//!
//! Interactive CLI that backs up a JavaScript project and reinstalls its
//! dependencies through the Aikido safe-chain scanner.

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rechain::cli::Cli;
use rechain::context::RunContext;
use rechain::reinstall::{self, RunOutcome};

/// Initialize logging; off by default, RUST_LOG overrides.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rechain=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let _cli = Cli::parse_args();

    let dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("✗ Cannot determine the working directory: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = RunContext::new(dir);
    if let Err(e) = ctx.hook_interrupts() {
        // Ctrl-C then falls back to killing the process, which is survivable
        debug!("Interrupt handler not installed: {}", e);
    }
    info!("Starting in {}", ctx.dir().display());

    match reinstall::run(&ctx) {
        Ok(RunOutcome::Completed { backup }) => {
            println!(
                "✅ Reinstall complete. Backup kept at {}",
                backup.path().display()
            );
        }
        Ok(RunOutcome::Skipped { command_path }) => {
            println!(
                "Skipped. The install command is saved at {}; run it yourself when ready.",
                command_path.display()
            );
        }
        Ok(RunOutcome::Interrupted) => {
            debug!("Interrupted, nothing more to do");
        }
        Ok(RunOutcome::Failed {
            stage,
            error,
            backup,
        }) => {
            eprintln!("❌ Reinstall failed while {}: {}", stage, error);
            if let Some(backup) = backup {
                eprintln!(
                    "⚠️  Your files are backed up at {}. node_modules may be in an inconsistent state; restore from the backup if needed.",
                    backup.path().display()
                );
            }
        }
        Err(e) if e.is_interrupted() => {
            debug!("Interrupted, nothing more to do");
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}
