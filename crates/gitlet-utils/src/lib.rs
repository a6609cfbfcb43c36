//! Shared plumbing for the gitlet crates: the exclusive atomic-rewrite
//! protocol used for every small-file update, git date/signature handling,
//! and work-tree path normalization.

pub mod atomic_file;
pub mod date;
pub mod error;
pub mod path;

pub use atomic_file::AtomicFile;
pub use error::{AtomicFileError, UtilError};

pub type Result<T> = std::result::Result<T, UtilError>;
