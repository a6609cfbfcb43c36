use std::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::error::RefError;

/// A validated reference name.
///
/// Enforces the rules from `git-check-ref-format(1)`: no `..`, no control
/// characters or ` ~^:?*[\`, no leading/trailing `/`, no `//`, no trailing
/// `.` or `.lock`, no `@{`, not the single character `@`. Names without a
/// `/` are only accepted for the special top-level refs like `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefName(BString);

/// Characters forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[u8] = b" ~^:?*[\\";

/// Top-level refs that are valid without a `/`.
const SPECIAL_REFS: &[&str] = &["HEAD", "ORIG_HEAD", "MERGE_HEAD", "FETCH_HEAD"];

impl RefName {
    /// Create and validate a ref name.
    pub fn new(name: impl Into<BString>) -> Result<Self, RefError> {
        let name = name.into();
        validate_ref_name(&name)?;
        Ok(Self(name))
    }

    /// The `HEAD` ref name.
    pub fn head() -> Self {
        Self(BString::from("HEAD"))
    }

    /// Build the full name of a local branch: `refs/heads/<branch>`.
    pub fn branch(branch: &str) -> Result<Self, RefError> {
        Self::new(format!("refs/heads/{branch}"))
    }

    /// Build the full name of a remote-tracking branch:
    /// `refs/remotes/<remote>/<branch>`.
    pub fn remote_branch(remote: &str, branch: &str) -> Result<Self, RefError> {
        Self::new(format!("refs/remotes/{remote}/{branch}"))
    }

    /// The short name (e.g., `main` from `refs/heads/main`).
    pub fn short_name(&self) -> &BStr {
        let s = self.0.as_bstr();
        for prefix in [b"refs/heads/".as_slice(), b"refs/tags/", b"refs/remotes/"] {
            if let Some(rest) = s.strip_prefix(prefix) {
                return rest.as_bstr();
            }
        }
        s
    }

    /// Is this under `refs/heads/`?
    pub fn is_branch(&self) -> bool {
        self.0.starts_with(b"refs/heads/")
    }

    /// Is this under `refs/tags/`?
    pub fn is_tag(&self) -> bool {
        self.0.starts_with(b"refs/tags/")
    }

    /// Is this under `refs/remotes/`?
    pub fn is_remote(&self) -> bool {
        self.0.starts_with(b"refs/remotes/")
    }

    /// The raw bytes of this ref name.
    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    /// As a string slice. Validated names are always ASCII in practice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("<invalid-utf8>")
    }
}

impl AsRef<BStr> for RefName {
    fn as_ref(&self) -> &BStr {
        self.0.as_bstr()
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a ref name per git-check-ref-format rules.
fn validate_ref_name(name: &[u8]) -> Result<(), RefError> {
    let name_str = || String::from_utf8_lossy(name).into_owned();

    if name.is_empty() {
        return Err(RefError::InvalidName("ref name is empty".into()));
    }
    if name == b"@" {
        return Err(RefError::InvalidName("'@' is not a valid ref name".into()));
    }

    for (i, &b) in name.iter().enumerate() {
        if b < 0x20 || b == 0x7f {
            return Err(RefError::InvalidName(format!(
                "'{}': control character at position {i}",
                name_str()
            )));
        }
        if FORBIDDEN_CHARS.contains(&b) {
            return Err(RefError::InvalidName(format!(
                "'{}': forbidden character '{}' at position {i}",
                name_str(),
                b as char
            )));
        }
    }

    if name.starts_with(b"/") || name.ends_with(b"/") {
        return Err(RefError::InvalidName(format!(
            "'{}': leading or trailing '/'",
            name_str()
        )));
    }
    if name.ends_with(b".") {
        return Err(RefError::InvalidName(format!(
            "'{}': ends with '.'",
            name_str()
        )));
    }
    if name.find(b"..").is_some() {
        return Err(RefError::InvalidName(format!(
            "'{}': contains '..'",
            name_str()
        )));
    }
    if name.find(b"//").is_some() {
        return Err(RefError::InvalidName(format!(
            "'{}': contains '//'",
            name_str()
        )));
    }
    if name.find(b"@{").is_some() {
        return Err(RefError::InvalidName(format!(
            "'{}': contains '@{{'",
            name_str()
        )));
    }

    for component in name.split_str(b"/") {
        if component.starts_with(b".") {
            return Err(RefError::InvalidName(format!(
                "'{}': component starts with '.'",
                name_str()
            )));
        }
        if component.ends_with(b".lock") {
            return Err(RefError::InvalidName(format!(
                "'{}': component ends with '.lock'",
                name_str()
            )));
        }
    }

    // Names without a slash are only allowed for the special top-level refs.
    if !name.contains(&b'/') {
        let s = String::from_utf8_lossy(name);
        if !SPECIAL_REFS.contains(&s.as_ref()) {
            return Err(RefError::InvalidName(format!(
                "'{}': one-level ref outside the special set",
                name_str()
            )));
        }
    }

    Ok(())
}
