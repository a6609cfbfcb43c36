//! Git object model: blob, tree, commit, tag parsing and serialization.
//!
//! Objects parse from and serialize to git's canonical framed form
//! `"<kind> <size>\0<payload>"`; the object's identity is the SHA-1 of
//! exactly those bytes. Parsing preserves header order so that re-emitting
//! a parsed object yields identical bytes and an identical hash.

mod blob;
mod commit;
pub mod header;
mod tag;
mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use tag::Tag;
pub use tree::{FileMode, Tree, TreeEntry};

use bstr::BString;
use gitlet_hash::{HashError, Hasher, ObjectId};

/// Errors produced by object parsing and serialization.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid object type: {0}")]
    InvalidType(BString),

    #[error("invalid object header: {0}")]
    InvalidHeader(String),

    #[error("truncated object: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("object size mismatch: header says {expected} bytes, payload has {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid tree entry at offset {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: String },

    #[error("invalid commit: missing '{field}' header")]
    MissingCommitField { field: &'static str },

    #[error("invalid tag: missing '{field}' header")]
    MissingTagField { field: &'static str },

    #[error("invalid file mode: {0}")]
    InvalidFileMode(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// The four kinds of git objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    /// Parse from the kind string in object headers.
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        match s {
            b"blob" => Ok(Self::Blob),
            b"tree" => Ok(Self::Tree),
            b"commit" => Ok(Self::Commit),
            b"tag" => Ok(Self::Tag),
            _ => Err(ObjectError::InvalidType(BString::from(s))),
        }
    }

    /// The canonical byte representation.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Blob => b"blob",
            Self::Tree => b"tree",
            Self::Commit => b"commit",
            Self::Tag => b"tag",
        }
    }

    /// The canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = ObjectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

/// A parsed git object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// Parse from framed bytes (header + payload).
    ///
    /// The declared size must match the payload length exactly.
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let (obj_type, declared_size, header_len) = header::parse_header(data)?;
        let payload = &data[header_len..];
        if payload.len() < declared_size {
            return Err(ObjectError::Truncated {
                expected: declared_size,
                actual: payload.len(),
            });
        }
        if payload.len() > declared_size {
            return Err(ObjectError::SizeMismatch {
                expected: declared_size,
                actual: payload.len(),
            });
        }
        Self::parse_payload(obj_type, payload)
    }

    /// Parse from payload bytes with a known kind (no header).
    pub fn parse_payload(obj_type: ObjectType, payload: &[u8]) -> Result<Self, ObjectError> {
        match obj_type {
            ObjectType::Blob => Ok(Self::Blob(Blob::parse(payload)?)),
            ObjectType::Tree => Ok(Self::Tree(Tree::parse(payload)?)),
            ObjectType::Commit => Ok(Self::Commit(Commit::parse(payload)?)),
            ObjectType::Tag => Ok(Self::Tag(Tag::parse(payload)?)),
        }
    }

    /// Serialize to the canonical framed form (header + payload).
    pub fn serialize(&self) -> Vec<u8> {
        let payload = self.serialize_payload();
        let hdr = header::write_header(self.object_type(), payload.len());
        let mut out = Vec::with_capacity(hdr.len() + payload.len());
        out.extend_from_slice(&hdr);
        out.extend_from_slice(&payload);
        out
    }

    /// Serialize just the payload (no header).
    pub fn serialize_payload(&self) -> Vec<u8> {
        match self {
            Self::Blob(b) => b.serialize_payload().to_vec(),
            Self::Tree(t) => t.serialize_payload(),
            Self::Commit(c) => c.serialize_payload(),
            Self::Tag(t) => t.serialize_payload(),
        }
    }

    /// The object's kind.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Blob(_) => ObjectType::Blob,
            Self::Tree(_) => ObjectType::Tree,
            Self::Commit(_) => ObjectType::Commit,
            Self::Tag(_) => ObjectType::Tag,
        }
    }

    /// Compute the OID: SHA-1 over the framed form.
    pub fn compute_oid(&self) -> ObjectId {
        Hasher::hash_object(self.object_type().as_str(), &self.serialize_payload())
    }
}
