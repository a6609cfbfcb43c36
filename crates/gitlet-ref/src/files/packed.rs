use std::fs;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use gitlet_hash::ObjectId;

use crate::error::RefError;
use crate::name::RefName;

/// A single entry in the packed-refs file.
#[derive(Debug, Clone)]
pub struct PackedRef {
    pub name: RefName,
    pub oid: ObjectId,
    /// Peeled target of an annotated tag (from a `^<hex>` continuation line).
    pub peeled: Option<ObjectId>,
}

/// Parsed packed-refs file.
///
/// Format, one ref per line:
/// ```text
/// # pack-refs with: peeled fully-peeled
/// <hex-oid> <full-name>
/// ^<hex-oid>
/// ```
/// Lines starting with `#` are comments. This store only ever reads the
/// file; deletions and updates go to loose refs and leave packed entries
/// in place.
#[derive(Debug, Clone, Default)]
pub struct PackedRefs {
    refs: Vec<PackedRef>,
}

impl PackedRefs {
    /// Parse packed-refs content.
    pub fn parse(data: &[u8]) -> Result<Self, RefError> {
        let mut refs: Vec<PackedRef> = Vec::new();

        for line in data.lines() {
            if line.is_empty() || line.starts_with(b"#") {
                continue;
            }

            // Peeled continuation for the preceding ref.
            if let Some(hex_bytes) = line.strip_prefix(b"^") {
                let hex = std::str::from_utf8(hex_bytes)
                    .map_err(|_| RefError::Parse("invalid UTF-8 in peeled OID".into()))?;
                let peeled = ObjectId::from_hex(hex.trim())?;
                if let Some(last) = refs.last_mut() {
                    last.peeled = Some(peeled);
                }
                continue;
            }

            let space_pos = line
                .find_byte(b' ')
                .ok_or_else(|| RefError::Parse("invalid packed-refs line".into()))?;

            let hex = std::str::from_utf8(&line[..space_pos])
                .map_err(|_| RefError::Parse("invalid UTF-8 in packed-refs OID".into()))?;
            let oid = ObjectId::from_hex(hex)?;

            let name_str = std::str::from_utf8(&line[space_pos + 1..])
                .map_err(|_| RefError::Parse("invalid UTF-8 in packed-refs name".into()))?;
            let name = RefName::new(name_str.trim())?;

            refs.push(PackedRef {
                name,
                oid,
                peeled: None,
            });
        }

        Ok(Self { refs })
    }

    /// Load packed-refs from disk. An absent file yields an empty set.
    pub fn load(git_dir: &Path) -> Result<Self, RefError> {
        let path = packed_refs_path(git_dir);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(RefError::IoPath {
                    path: path.clone(),
                    source: e,
                })
            }
        };
        Self::parse(&data)
    }

    /// Look up a ref by name.
    pub fn find(&self, name: &RefName) -> Option<&PackedRef> {
        self.refs.iter().find(|pr| pr.name == *name)
    }

    /// All packed refs in file order.
    pub fn refs(&self) -> &[PackedRef] {
        &self.refs
    }

    /// Whether the file held no refs.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// The path of the packed-refs file.
fn packed_refs_path(git_dir: &Path) -> PathBuf {
    git_dir.join("packed-refs")
}
