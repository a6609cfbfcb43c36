use sha1::{Digest, Sha1};

use crate::ObjectId;

/// Streaming SHA-1 computation.
///
/// Data can be fed incrementally with [`update`](Hasher::update) or through
/// the [`std::io::Write`] implementation, then finalised into an
/// [`ObjectId`].
pub struct Hasher {
    inner: Sha1,
}

impl Hasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self { inner: Sha1::new() }
    }

    /// Feed data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalize and return the ObjectId.
    pub fn finalize(self) -> ObjectId {
        let digest = self.inner.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest);
        // from_bytes cannot fail on a 20-byte digest
        ObjectId::from_bytes(&bytes).unwrap_or(ObjectId::NULL)
    }

    /// Convenience: hash data in one call.
    pub fn digest(data: &[u8]) -> ObjectId {
        let mut h = Self::new();
        h.update(data);
        h.finalize()
    }

    /// Hash an object in its framed form: `"<kind> <len>\0<content>"`.
    pub fn hash_object(kind: &str, content: &[u8]) -> ObjectId {
        let header = format!("{} {}\0", kind, content.len());
        let mut h = Self::new();
        h.update(header.as_bytes());
        h.update(content);
        h.finalize()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        // SHA-1 of the empty string.
        assert_eq!(
            Hasher::digest(b"").to_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn incremental_matches_oneshot() {
        let mut h = Hasher::new();
        h.update(b"hello ");
        h.update(b"world");
        assert_eq!(h.finalize(), Hasher::digest(b"hello world"));
    }

    #[test]
    fn write_trait_matches_update() {
        use std::io::Write;
        let mut h = Hasher::new();
        h.write_all(b"hello world").unwrap();
        assert_eq!(h.finalize(), Hasher::digest(b"hello world"));
    }

    #[test]
    fn hash_object_blob_hello() {
        // `echo -n hello | git hash-object --stdin`
        assert_eq!(
            Hasher::hash_object("blob", b"hello").to_hex(),
            "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0"
        );
    }

    #[test]
    fn hash_object_empty_tree() {
        // The well-known empty tree OID.
        assert_eq!(
            Hasher::hash_object("tree", b"").to_hex(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }
}
