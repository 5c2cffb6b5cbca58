//! Error types for mesh loading and indexing.

use thiserror::Error;

/// Errors that can occur while loading or indexing a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Input is not organized as complete triangles.
    #[error("invalid mesh shape: {0}")]
    InvalidMeshShape(String),

    /// The mesh file could not be parsed as STL.
    #[error("failed to parse STL: {0}")]
    Stl(String),

    /// An I/O error occurred while reading or writing a mesh file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
