use crate::ObjectError;

/// Opaque file contents, addressed by the hash of their framed form.
///
/// Unlike the other object kinds there is nothing to decode: the payload is
/// the contents, byte for byte, and parsing can never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Parse blob payload. Infallible; the `Result` keeps the codec surface
    /// uniform across object kinds.
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        Ok(payload.into())
    }

    /// Serialize: the payload is the contents themselves.
    pub fn serialize_payload(&self) -> &[u8] {
        &self.data
    }

    /// Size of the contents in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the blob holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }
}
