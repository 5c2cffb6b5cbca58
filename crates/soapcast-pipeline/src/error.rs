//! Error types for the render pipeline.

use std::path::PathBuf;

use soapcast_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while running the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input file type is not accepted or its content does not match.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Scale percentages must be finite and non-negative.
    #[error("invalid scale: {0}")]
    InvalidScale(String),

    /// The model template lacks the expected scale literals.
    #[error("template {path}: {message}")]
    Template {
        /// Template file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// An external tool could not be started.
    #[error("{tool} could not be started: {source}")]
    ToolNotFound {
        /// Executable name.
        tool: String,
        /// Spawn error.
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        /// Executable name.
        tool: String,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// An external tool reported success but did not write its output.
    #[error("{tool} did not produce {}", path.display())]
    MissingOutput {
        /// Executable name.
        tool: String,
        /// Expected output file.
        path: PathBuf,
    },

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The rendered mesh could not be loaded or indexed.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
