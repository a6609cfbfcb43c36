use bstr::{BStr, BString, ByteSlice};
use gitlet_hash::ObjectId;
use gitlet_utils::date::Signature;

use crate::{ObjectError, ObjectType};

/// A git annotated tag object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// OID of the tagged object.
    pub target: ObjectId,
    /// Kind of the tagged object.
    pub target_type: ObjectType,
    /// Tag name.
    pub tag_name: BString,
    /// Tagger identity and timestamp (absent in some very old tags).
    pub tagger: Option<Signature>,
    /// Tag message.
    pub message: BString,
    /// Optional signature block trailing the message.
    pub gpgsig: Option<BString>,
}

impl Tag {
    /// Parse tag payload (no object header).
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        let mut target: Option<ObjectId> = None;
        let mut target_type: Option<ObjectType> = None;
        let mut tag_name: Option<BString> = None;
        let mut tagger: Option<Signature> = None;
        let mut gpgsig: Option<BString> = None;

        let data = payload;
        let mut pos = 0;

        loop {
            if pos >= data.len() {
                break;
            }

            if data[pos] == b'\n' {
                pos += 1;
                break;
            }

            let line_end = data[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| p + pos)
                .unwrap_or(data.len());
            let line = &data[pos..line_end];

            if let Some(space_pos) = line.iter().position(|&b| b == b' ') {
                let key = &line[..space_pos];
                let value = &line[space_pos + 1..];

                match key {
                    b"object" => {
                        let hex = std::str::from_utf8(value).map_err(|_| {
                            ObjectError::InvalidHeader("non-UTF8 target OID".into())
                        })?;
                        target = Some(ObjectId::from_hex(hex)?);
                    }
                    b"type" => {
                        target_type = Some(ObjectType::from_bytes(value)?);
                    }
                    b"tag" => {
                        tag_name = Some(BString::from(value));
                    }
                    b"tagger" => {
                        tagger = Some(
                            Signature::parse(BStr::new(value))
                                .map_err(|e| ObjectError::InvalidSignature(e.to_string()))?,
                        );
                    }
                    _ => {}
                }
            }

            pos = line_end + 1;
        }

        // A PGP/SSH signature block at the end of the message is split off.
        let remaining = &data[pos..];
        let message = if let Some(sig_start) = remaining
            .find(b"-----BEGIN PGP SIGNATURE-----")
            .or_else(|| remaining.find(b"-----BEGIN SSH SIGNATURE-----"))
        {
            gpgsig = Some(BString::from(&remaining[sig_start..]));
            BString::from(&remaining[..sig_start])
        } else {
            BString::from(remaining)
        };

        let target = target.ok_or(ObjectError::MissingTagField { field: "object" })?;
        let target_type = target_type.ok_or(ObjectError::MissingTagField { field: "type" })?;
        let tag_name = tag_name.ok_or(ObjectError::MissingTagField { field: "tag" })?;

        Ok(Self {
            target,
            target_type,
            tag_name,
            tagger,
            message,
            gpgsig,
        })
    }

    /// Serialize tag payload (no object header).
    pub fn serialize_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"object ");
        out.extend_from_slice(self.target.to_hex().as_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"type ");
        out.extend_from_slice(self.target_type.as_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"tag ");
        out.extend_from_slice(&self.tag_name);
        out.push(b'\n');

        if let Some(ref tagger) = self.tagger {
            out.extend_from_slice(b"tagger ");
            out.extend_from_slice(&tagger.to_bytes());
            out.push(b'\n');
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        if let Some(ref sig) = self.gpgsig {
            out.extend_from_slice(sig);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tag_bytes() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"object da39a3ee5e6b4b0d3255bfef95601890afd80709\n");
        out.extend_from_slice(b"type commit\n");
        out.extend_from_slice(b"tag v1.0\n");
        out.extend_from_slice(b"tagger T <t@example.com> 1700000000 +0000\n");
        out.extend_from_slice(b"\nRelease v1.0\n");
        out
    }

    #[test]
    fn parse_tag() {
        let tag = Tag::parse(&sample_tag_bytes()).unwrap();
        assert_eq!(tag.target_type, ObjectType::Commit);
        assert_eq!(tag.tag_name, "v1.0");
        assert_eq!(tag.tagger.as_ref().unwrap().name, "T");
        assert_eq!(tag.message, "Release v1.0\n");
    }

    #[test]
    fn serialize_roundtrip_is_byte_exact() {
        let original = sample_tag_bytes();
        let tag = Tag::parse(&original).unwrap();
        assert_eq!(tag.serialize_payload(), original);
    }

    #[test]
    fn tag_without_tagger() {
        let data = b"object da39a3ee5e6b4b0d3255bfef95601890afd80709\ntype blob\ntag old\n\nmsg\n";
        let tag = Tag::parse(data).unwrap();
        assert!(tag.tagger.is_none());
        assert_eq!(tag.serialize_payload(), data);
    }

    #[test]
    fn signature_block_split_and_rejoined() {
        let mut data = sample_tag_bytes();
        data.extend_from_slice(b"-----BEGIN PGP SIGNATURE-----\nabc\n-----END PGP SIGNATURE-----\n");
        let tag = Tag::parse(&data).unwrap();
        assert_eq!(tag.message, "Release v1.0\n");
        assert!(tag.gpgsig.as_ref().unwrap().starts_with(b"-----BEGIN"));
        assert_eq!(tag.serialize_payload(), data);
    }

    #[test]
    fn missing_object_errors() {
        assert!(matches!(
            Tag::parse(b"type commit\ntag v1\n\nmsg\n"),
            Err(ObjectError::MissingTagField { field: "object" })
        ));
    }
}
