use std::path::PathBuf;

use gitlet_hash::ObjectId;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("object not found: {0}")]
    MissingObject(ObjectId),

    #[error("object {0} is not a commit")]
    NotACommit(ObjectId),

    #[error("path is outside the work tree: {0}")]
    PathOutsideWorkTree(PathBuf),

    #[error(transparent)]
    Config(#[from] gitlet_config::ConfigError),

    #[error(transparent)]
    Loose(#[from] gitlet_loose::LooseError),

    #[error(transparent)]
    Ref(#[from] gitlet_ref::RefError),

    #[error(transparent)]
    Index(#[from] gitlet_index::IndexError),

    #[error(transparent)]
    Object(#[from] gitlet_object::ObjectError),

    #[error("{0}")]
    Util(#[from] gitlet_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
