use bstr::{BStr, BString, ByteSlice};
use gitlet_hash::ObjectId;
use gitlet_utils::date::Signature;

use crate::ObjectError;

/// A git commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// OID of the root tree.
    pub tree: ObjectId,
    /// Parent commit OIDs in stored order (empty for a root commit).
    pub parents: Vec<ObjectId>,
    /// Author identity and timestamp.
    pub author: Signature,
    /// Committer identity and timestamp.
    pub committer: Signature,
    /// Optional encoding header.
    pub encoding: Option<BString>,
    /// Optional GPG signature (multi-line).
    pub gpgsig: Option<BString>,
    /// Unknown headers, preserved for byte-exact round-trips.
    pub extra_headers: Vec<(BString, BString)>,
    /// Commit message: everything after the blank line, verbatim.
    pub message: BString,
}

impl Commit {
    /// Parse commit payload (no object header).
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        let mut tree: Option<ObjectId> = None;
        let mut parents = Vec::new();
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;
        let mut encoding: Option<BString> = None;
        let mut gpgsig: Option<BString> = None;
        let mut extra_headers: Vec<(BString, BString)> = Vec::new();

        let data = payload;
        let mut pos = 0;

        loop {
            if pos >= data.len() {
                break;
            }

            // A blank line separates headers from the message.
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
                    b"tree" => {
                        tree = Some(parse_oid_value(value, "tree")?);
                    }
                    b"parent" => {
                        parents.push(parse_oid_value(value, "parent")?);
                    }
                    b"author" => {
                        author = Some(parse_signature(value)?);
                    }
                    b"committer" => {
                        committer = Some(parse_signature(value)?);
                    }
                    b"encoding" => {
                        encoding = Some(BString::from(value));
                    }
                    b"gpgsig" => {
                        let (sig, next) = read_continuation(data, value, line_end);
                        gpgsig = Some(sig);
                        pos = next;
                        continue;
                    }
                    _ => {
                        // Unknown header, possibly multi-line.
                        let (val, next) = read_continuation(data, value, line_end);
                        extra_headers.push((BString::from(key), val));
                        pos = next;
                        continue;
                    }
                }
            }

            pos = line_end + 1;
        }

        let tree = tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?;
        let author = author.ok_or(ObjectError::MissingCommitField { field: "author" })?;
        let committer =
            committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?;

        Ok(Self {
            tree,
            parents,
            author,
            committer,
            encoding,
            gpgsig,
            extra_headers,
            message: BString::from(&data[pos..]),
        })
    }

    /// Serialize commit payload (no object header).
    pub fn serialize_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');

        for parent in &self.parents {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }

        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"committer ");
        out.extend_from_slice(&self.committer.to_bytes());
        out.push(b'\n');

        if let Some(ref enc) = self.encoding {
            out.extend_from_slice(b"encoding ");
            out.extend_from_slice(enc);
            out.push(b'\n');
        }

        if let Some(ref sig) = self.gpgsig {
            out.extend_from_slice(b"gpgsig ");
            write_continuation(&mut out, sig);
            out.push(b'\n');
        }

        for (key, val) in &self.extra_headers {
            out.extend_from_slice(key);
            out.push(b' ');
            write_continuation(&mut out, val);
            out.push(b'\n');
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        out
    }

    /// The first parent, or None for a root commit.
    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Does this commit have more than one parent?
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Does this commit have no parents?
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// The first line of the message.
    pub fn summary(&self) -> &BStr {
        let msg: &[u8] = self.message.as_ref();
        match msg.find_byte(b'\n') {
            Some(pos) => BStr::new(&msg[..pos]),
            None => BStr::new(msg),
        }
    }
}

/// Read the continuation lines of a multi-line header.
///
/// Continuation lines start with a single space; the space is stripped and a
/// '\n' joins the pieces. Returns the header value and the position just
/// past the last continuation line.
fn read_continuation(data: &[u8], first: &[u8], line_end: usize) -> (BString, usize) {
    let mut value = Vec::from(first);
    let mut next = line_end + 1;
    while next < data.len() && data[next] == b' ' {
        value.push(b'\n');
        let cont_end = data[next..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| p + next)
            .unwrap_or(data.len());
        value.extend_from_slice(&data[next + 1..cont_end]);
        next = cont_end + 1;
    }
    (BString::from(value), next)
}

/// Emit a multi-line header value with space-prefixed continuation lines.
fn write_continuation(out: &mut Vec<u8>, value: &[u8]) {
    for (i, line) in value.split(|&b| b == b'\n').enumerate() {
        if i > 0 {
            out.push(b'\n');
            out.push(b' ');
        }
        out.extend_from_slice(line);
    }
}

fn parse_oid_value(value: &[u8], field: &'static str) -> Result<ObjectId, ObjectError> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| ObjectError::InvalidHeader(format!("non-UTF8 {field} OID")))?;
    Ok(ObjectId::from_hex(hex)?)
}

fn parse_signature(data: &[u8]) -> Result<Signature, ObjectError> {
    Signature::parse(BStr::new(data)).map_err(|e| ObjectError::InvalidSignature(e.to_string()))
}
