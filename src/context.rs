//! Run context and cancellation
//!
//! Every component receives the working directory and the cancellation token
//! through `RunContext` instead of reaching for process-wide state. The token
//! is set from the Ctrl-C handler and observed between subprocess steps; a
//! child that is already running is never killed, the run stops at the next
//! step boundary.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{RechainError, Result};

/// Shared flag that marks the run as cancelled.
///
/// Clones share the underlying flag, so the copy handed to the signal
/// handler trips the copy held by the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Turn a pending cancellation into an `Interrupted` error.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(RechainError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Explicit per-run configuration passed into each component.
#[derive(Debug, Clone)]
pub struct RunContext {
    dir: PathBuf,
    cancel: CancelToken,
}

impl RunContext {
    /// Create a context rooted at `dir` with a fresh cancellation token.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            cancel: CancelToken::new(),
        }
    }

    /// The project directory this run operates on.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Install a Ctrl-C handler that trips this context's token.
    ///
    /// Only effective outside raw mode; the prompts translate Ctrl-C key
    /// events themselves while raw mode suppresses the signal.
    pub fn hook_interrupts(&self) -> Result<()> {
        let token = self.cancel.clone();
        ctrlc::set_handler(move || token.cancel()).map_err(|e| {
            RechainError::terminal(format!("Failed to install interrupt handler: {}", e))
        })
    }
}
