use std::path::PathBuf;

/// Base error type for gitlet-utils operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error(transparent)]
    Atomic(#[from] AtomicFileError),

    #[error("date parse error: {0}")]
    DateParse(String),

    #[error("invalid entry path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of the exclusive atomic-rewrite protocol.
#[derive(Debug, thiserror::Error)]
pub enum AtomicFileError {
    #[error("cannot update '{target}': another writer holds its lock")]
    Busy { target: PathBuf },

    #[error("cannot stage an update for '{target}': {source}")]
    Stage {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot install the update for '{target}': {source}")]
    Install {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
