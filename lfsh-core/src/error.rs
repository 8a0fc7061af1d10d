//! Error types for lfsh

use thiserror::Error;

/// Main error type for lfsh operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Index {index} out of range for point cloud of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Cancelled after {completed} of {total} units")]
    Cancelled { completed: usize, total: usize },

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for lfsh operations
pub type Result<T> = std::result::Result<T, Error>;
