//! The framing header shared by all object kinds: `"<kind> <size>\0"`.

use crate::{ObjectError, ObjectType};

/// Parse the framing header off the front of `data`.
///
/// Returns `(kind, declared_size, header_length)`; `header_length` counts
/// the null terminator, so `data[header_length..]` is the payload.
pub fn parse_header(data: &[u8]) -> Result<(ObjectType, usize, usize), ObjectError> {
    let header_end = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| malformed("no null terminator"))?;

    let mut fields = data[..header_end].splitn(2, |&b| b == b' ');
    let kind_bytes = fields.next().unwrap_or_default();
    let size_bytes = fields
        .next()
        .ok_or_else(|| malformed("no space between kind and size"))?;

    let kind = ObjectType::from_bytes(kind_bytes)?;
    let declared_size = decimal_size(size_bytes).ok_or_else(|| {
        malformed(&format!(
            "size is not a decimal number: {:?}",
            String::from_utf8_lossy(size_bytes)
        ))
    })?;

    Ok((kind, declared_size, header_end + 1))
}

/// Render a framing header for a payload of `payload_size` bytes.
pub fn write_header(kind: ObjectType, payload_size: usize) -> Vec<u8> {
    let size_digits = payload_size.to_string();
    let mut hdr = Vec::with_capacity(kind.as_bytes().len() + size_digits.len() + 2);
    hdr.extend_from_slice(kind.as_bytes());
    hdr.push(b' ');
    hdr.extend_from_slice(size_digits.as_bytes());
    hdr.push(0);
    hdr
}

/// Fold ASCII digits into a size, rejecting anything else (including signs
/// and overflow).
fn decimal_size(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0usize, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(usize::from(b - b'0'))
    })
}

fn malformed(reason: &str) -> ObjectError {
    ObjectError::InvalidHeader(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_blob_header() {
        let data = b"blob 12\0hello world!";
        let (kind, size, hdr_len) = parse_header(data).unwrap();
        assert_eq!(kind, ObjectType::Blob);
        assert_eq!(size, 12);
        assert_eq!(hdr_len, 8);
        assert_eq!(&data[hdr_len..], b"hello world!");
    }

    #[test]
    fn write_and_parse_roundtrip() {
        for (kind, size) in [
            (ObjectType::Tree, 0),
            (ObjectType::Commit, 42),
            (ObjectType::Tag, 70_000),
        ] {
            let hdr = write_header(kind, size);
            let (parsed_kind, parsed_size, len) = parse_header(&hdr).unwrap();
            assert_eq!(parsed_kind, kind);
            assert_eq!(parsed_size, size);
            assert_eq!(len, hdr.len());
        }
    }

    #[test]
    fn missing_null() {
        assert!(parse_header(b"blob 12").is_err());
    }

    #[test]
    fn missing_space() {
        assert!(parse_header(b"blob12\0").is_err());
    }

    #[test]
    fn unknown_kind() {
        assert!(parse_header(b"sausage 12\0").is_err());
    }

    #[test]
    fn non_numeric_size() {
        assert!(parse_header(b"blob abc\0").is_err());
        assert!(parse_header(b"blob -1\0").is_err());
        assert!(parse_header(b"blob \0").is_err());
    }

    #[test]
    fn size_overflow_rejected() {
        let huge = b"blob 99999999999999999999999999999999\0";
        assert!(parse_header(huge).is_err());
    }
}
