//! External tool invocation.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::error::{PipelineError, Result};

/// Captured result of one external process.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Whether the process exited successfully.
    pub success: bool,
    /// Human-readable exit status.
    pub status: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Runs external programs for the pipeline.
pub trait ToolRunner {
    /// Run `program` with `args` inside `cwd` and wait for it to exit.
    ///
    /// Only failure to start the process is an error here; a non-zero exit
    /// is reported through [`ToolOutput::success`].
    fn run(&self, program: &str, args: &[OsString], cwd: &Path) -> Result<ToolOutput>;
}

/// Runs programs as child processes, passing arguments directly (no shell).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString], cwd: &Path) -> Result<ToolOutput> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|source| PipelineError::ToolNotFound {
                tool: program.to_string(),
                source,
            })?;

        Ok(ToolOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Run a tool and turn an unsuccessful exit into [`PipelineError::ToolFailed`].
pub fn invoke(runner: &dyn ToolRunner, program: &str, args: &[OsString], cwd: &Path) -> Result<()> {
    log::debug!("running {} {:?}", program, args);
    let output = runner.run(program, args, cwd)?;
    if output.success {
        Ok(())
    } else {
        Err(PipelineError::ToolFailed {
            tool: program.to_string(),
            status: output.status,
            stderr: output.stderr,
        })
    }
}
