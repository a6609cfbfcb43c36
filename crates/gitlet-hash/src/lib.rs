//! Object identity for gitlet.
//!
//! Provides the 20-byte SHA-1 `ObjectId`, hex encoding/decoding, and the
//! streaming `Hasher` used to compute content hashes over the canonical
//! framed object form.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;
