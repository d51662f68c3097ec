//! Subprocess boundary
//!
//! Every external command goes through here. Child stdio is discarded, the
//! exit code is the only signal, and the run context's cancel token is
//! checked before anything spawns. Calls block until the child exits; there
//! is no timeout.

use std::fmt;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::context::RunContext;
use crate::error::{RechainError, Result};

/// A fully-resolved command line for one orchestrated step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Run one step to completion, rejecting it on a non-zero exit.
///
/// Honors the context's cancel token before spawning. Exit code -1 stands
/// for "killed by signal" in the resulting error.
pub fn run_checked(ctx: &RunContext, spec: &CommandSpec) -> Result<()> {
    ctx.cancel_token().check()?;
    debug!("Running `{}` in {}", spec, ctx.dir().display());
    let status = Command::new(spec.program())
        .args(spec.argv())
        .current_dir(ctx.dir())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| RechainError::spawn(spec.to_string(), e))?;

    if status.success() {
        debug!("`{}` succeeded", spec);
        Ok(())
    } else {
        Err(RechainError::subprocess(
            spec.to_string(),
            status.code().unwrap_or(-1),
        ))
    }
}

/// True if `program arg` runs and exits zero.
///
/// Spawn failures count as false; used for the installed checks and the
/// scanner probe, where absence is an answer rather than an error.
pub fn probe(program: &str, arg: &str) -> bool {
    Command::new(program)
        .arg(arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
