use std::fs;
use std::io::Read;

use flate2::read::ZlibDecoder;
use gitlet_hash::{Hasher, ObjectId};
use gitlet_object::Object;

use crate::{LooseError, LooseObjectStore};

impl LooseObjectStore {
    /// Check whether a loose object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read a loose object by OID.
    ///
    /// The framed bytes are re-hashed and checked against the requested key,
    /// so a partially written or tampered file surfaces as
    /// [`LooseError::HashMismatch`] rather than a bogus object.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    pub fn read(&self, oid: &ObjectId) -> Result<Option<Object>, LooseError> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LooseError::Io(e)),
        };

        let framed = decompress_all(&compressed, oid)?;

        let actual_oid = Hasher::digest(&framed);
        if actual_oid != *oid {
            return Err(LooseError::HashMismatch {
                path,
                expected: oid.to_hex(),
                actual: actual_oid.to_hex(),
            });
        }

        let obj = Object::parse(&framed)?;
        Ok(Some(obj))
    }
}

/// Zlib-decompress the full contents of a loose object file.
fn decompress_all(compressed: &[u8], oid: &ObjectId) -> Result<Vec<u8>, LooseError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut framed = Vec::new();
    decoder
        .read_to_end(&mut framed)
        .map_err(|e| LooseError::Decompress {
            oid: oid.to_hex(),
            source: e,
        })?;
    Ok(framed)
}
