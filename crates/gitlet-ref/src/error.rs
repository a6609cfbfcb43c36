use std::path::PathBuf;

/// Error types for reference operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("invalid ref name: {0}")]
    InvalidName(String),

    #[error("ref not found: {0}")]
    NotFound(String),

    #[error("symbolic ref cycle detected at: {0}")]
    CycleDetected(String),

    #[error("symbolic ref chain starting at '{0}' exceeds {1} hops")]
    TooDeep(String, usize),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Util(#[from] gitlet_utils::UtilError),

    #[error("I/O error on {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Hash(#[from] gitlet_hash::HashError),
}
