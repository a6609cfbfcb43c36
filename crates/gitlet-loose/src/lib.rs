//! Loose object storage: read and write zlib-compressed objects.
//!
//! Each loose object lives at `objects/xx/yyyy...` where `xx` is the first
//! byte of the OID in hex and `yyyy...` is the rest. The file content is the
//! zlib-compressed framed form `"<kind> <size>\0<payload>"`; the OID is the
//! SHA-1 of the uncompressed framed bytes.

mod read;
mod write;

use std::path::{Path, PathBuf};

use gitlet_hash::ObjectId;

/// Interface to the loose object directory (`.git/objects/`).
pub struct LooseObjectStore {
    /// Path to the objects directory.
    objects_dir: PathBuf,
    /// Zlib compression level.
    compression_level: flate2::Compression,
}

impl LooseObjectStore {
    /// Open the loose object store at the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression_level: flate2::Compression::default(),
        }
    }

    /// Set the zlib compression level (0-9).
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = flate2::Compression::new(level);
    }

    /// The objects directory path.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// The file path for a given OID.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.loose_path())
    }
}

/// Errors from loose object operations.
#[derive(Debug, thiserror::Error)]
pub enum LooseError {
    #[error("corrupt loose object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hash mismatch for {path}: expected {expected}, got {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("object parse error: {0}")]
    Object(#[from] gitlet_object::ObjectError),

    #[error("hash error: {0}")]
    Hash(#[from] gitlet_hash::HashError),
}
