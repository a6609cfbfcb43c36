//! Work-tree entry path normalization.
//!
//! Index entries store forward-slash separated paths relative to the work
//! tree, with no leading separator and no `.`/`..` components.

use std::path::{Component, Path};

use bstr::{BStr, BString, ByteSlice};

use crate::error::UtilError;
use crate::Result;

/// Normalize a work-tree-relative path into index entry form.
///
/// Rejects absolute paths, `.`/`..` components, and anything else that could
/// escape the work tree. On Windows, backslash separators become `/`.
pub fn normalize_entry_path(rel: &Path) -> Result<BString> {
    let mut out = BString::from(Vec::new());

    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| UtilError::InvalidPath {
                    path: rel.display().to_string(),
                    reason: "non-UTF-8 component".into(),
                })?;
                if !out.is_empty() {
                    out.push(b'/');
                }
                out.extend_from_slice(part.as_bytes());
            }
            Component::CurDir | Component::ParentDir => {
                return Err(UtilError::InvalidPath {
                    path: rel.display().to_string(),
                    reason: "'.' and '..' components are not allowed".into(),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(UtilError::InvalidPath {
                    path: rel.display().to_string(),
                    reason: "path must be relative".into(),
                });
            }
        }
    }

    if out.is_empty() {
        return Err(UtilError::InvalidPath {
            path: rel.display().to_string(),
            reason: "empty path".into(),
        });
    }

    Ok(out)
}

/// Check that a stored entry path obeys the index invariants.
pub fn is_valid_entry_path(path: &BStr) -> bool {
    if path.is_empty() || path.starts_with(b"/") {
        return false;
    }
    path.split_str(b"/")
        .all(|c| !c.is_empty() && c != b"." && c != b"..")
}
