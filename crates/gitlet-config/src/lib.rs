//! Repository configuration for gitlet.
//!
//! Parses the INI-like config text into a flat entry list and exposes a
//! typed model over the sections the core consumes: `core.*`,
//! `branch.<name>.{remote,merge}`, and `remote.<name>.{url,fetch}`. A
//! general `(section, subsection, key)` lookup covers everything else.

pub mod parse;
pub mod types;

use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice, ByteVec};
use gitlet_utils::AtomicFile;

pub use parse::RawEntry;
pub use types::{parse_bool, parse_int};

/// The default fetch refspec installed for a new remote.
pub fn default_fetch_refspec(remote: &str) -> String {
    format!("+refs/heads/*:refs/remotes/{remote}/*")
}

/// Errors from configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("invalid boolean value: {0}")]
    InvalidBool(String),

    #[error("invalid integer value: {0}")]
    InvalidInt(String),

    #[error("remote '{0}' already exists")]
    RemoteExists(String),

    #[error("branch '{0}' already exists")]
    BranchExists(String),

    #[error("config has no backing file")]
    NoPath,

    #[error("{0}")]
    Util(#[from] gitlet_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The `[core]` options the repository core reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub repository_format_version: i64,
    pub filemode: bool,
    pub bare: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            repository_format_version: 0,
            filemode: false,
            bare: false,
        }
    }
}

/// A `[remote "<name>"]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub name: String,
    pub url: String,
    /// Fetch refspec, e.g. `+refs/heads/*:refs/remotes/origin/*`.
    pub fetch: String,
}

/// A `[branch "<name>"]` section: the branch's upstream coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchConfig {
    /// Remote name (`branch.<name>.remote`).
    pub remote: String,
    /// Full ref name on the remote (`branch.<name>.merge`),
    /// e.g. `refs/heads/master`.
    pub merge: String,
}

/// A parsed configuration file.
pub struct Config {
    path: Option<PathBuf>,
    entries: Vec<RawEntry>,
}

impl Config {
    /// An empty configuration with no backing file.
    pub fn new() -> Self {
        Self {
            path: None,
            entries: Vec::new(),
        }
    }

    /// Parse configuration from bytes.
    pub fn parse(content: &[u8]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: None,
            entries: parse::parse_config(content)?,
        })
    }

    /// Load a config file from disk. An absent file yields an empty config
    /// still bound to that path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(content) => parse::parse_config(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    /// The backing file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // --- Escape hatch: raw lookups ---

    /// The last value for `(section, subsection, name)`; later occurrences
    /// override earlier ones. `Some(None)` means the key is present with no
    /// value (boolean true).
    pub fn get(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Option<Option<&BStr>> {
        self.entries
            .iter()
            .rev()
            .find(|e| entry_matches(e, section, subsection, name))
            .map(|e| e.value.as_deref().map(|v| v.as_bstr()))
    }

    /// The last value as a string-ish byte slice, `None` when missing or
    /// valueless.
    pub fn get_value(&self, section: &str, subsection: Option<&str>, name: &str) -> Option<&BStr> {
        self.get(section, subsection, name).flatten()
    }

    /// All values for a key, in file order.
    pub fn get_all(&self, section: &str, subsection: Option<&str>, name: &str) -> Vec<&BStr> {
        self.entries
            .iter()
            .filter(|e| entry_matches(e, section, subsection, name))
            .filter_map(|e| e.value.as_deref().map(|v| v.as_bstr()))
            .collect()
    }

    /// Boolean lookup with git truthiness. `Ok(None)` when absent.
    pub fn get_bool(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<Option<bool>, ConfigError> {
        match self.get(section, subsection, name) {
            Some(value) => Ok(Some(parse_bool(value)?)),
            None => Ok(None),
        }
    }

    /// Integer lookup. `Ok(None)` when absent.
    pub fn get_int(
        &self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
    ) -> Result<Option<i64>, ConfigError> {
        match self.get_value(section, subsection, name) {
            Some(value) => Ok(Some(parse_int(value)?)),
            None => Ok(None),
        }
    }

    /// Set a value: replaces the last occurrence or appends a new entry.
    pub fn set(
        &mut self,
        section: &str,
        subsection: Option<&str>,
        name: &str,
        value: impl Into<BString>,
    ) {
        let value = Some(value.into());
        if let Some(existing) = self
            .entries
            .iter_mut()
            .rev()
            .find(|e| entry_matches(e, section, subsection, name))
        {
            existing.value = value;
            return;
        }

        // Append next to the section's other keys so serialization groups
        // them; otherwise at the end.
        let entry = RawEntry {
            section: BString::from(section.to_ascii_lowercase()),
            subsection: subsection.map(BString::from),
            name: BString::from(name.to_ascii_lowercase()),
            value,
        };
        let insert_at = self
            .entries
            .iter()
            .rposition(|e| e.section == entry.section && e.subsection == entry.subsection)
            .map(|pos| pos + 1)
            .unwrap_or(self.entries.len());
        self.entries.insert(insert_at, entry);
    }

    // --- Typed model ---

    /// The `[core]` section, with git's defaults for missing keys.
    pub fn core(&self) -> Result<CoreConfig, ConfigError> {
        Ok(CoreConfig {
            repository_format_version: self
                .get_int("core", None, "repositoryformatversion")?
                .unwrap_or(0),
            filemode: self.get_bool("core", None, "filemode")?.unwrap_or(false),
            bare: self.get_bool("core", None, "bare")?.unwrap_or(false),
        })
    }

    /// One remote by name.
    pub fn remote(&self, name: &str) -> Option<RemoteConfig> {
        let url = self.get_value("remote", Some(name), "url")?;
        let fetch = self
            .get_value("remote", Some(name), "fetch")
            .map(|v| v.to_string())
            .unwrap_or_else(|| default_fetch_refspec(name));
        Some(RemoteConfig {
            name: name.to_string(),
            url: url.to_string(),
            fetch,
        })
    }

    /// All remotes, in first-appearance order.
    pub fn remotes(&self) -> Vec<RemoteConfig> {
        let mut names: Vec<&BString> = Vec::new();
        for e in &self.entries {
            if e.section == "remote" {
                if let Some(ref sub) = e.subsection {
                    if !names.contains(&sub) {
                        names.push(sub);
                    }
                }
            }
        }
        names
            .into_iter()
            .filter_map(|n| self.remote(&n.to_string()))
            .collect()
    }

    /// A branch's upstream configuration, if both halves are present.
    pub fn branch(&self, name: &str) -> Option<BranchConfig> {
        let remote = self.get_value("branch", Some(name), "remote")?;
        let merge = self.get_value("branch", Some(name), "merge")?;
        Some(BranchConfig {
            remote: remote.to_string(),
            merge: merge.to_string(),
        })
    }

    /// Add a remote with the default fetch refspec.
    ///
    /// Fails with [`ConfigError::RemoteExists`] if a remote of that name is
    /// already configured.
    pub fn add_remote(&mut self, name: &str, url: &str) -> Result<(), ConfigError> {
        if self.get_value("remote", Some(name), "url").is_some() {
            return Err(ConfigError::RemoteExists(name.to_string()));
        }
        self.set("remote", Some(name), "url", url);
        self.set("remote", Some(name), "fetch", default_fetch_refspec(name));
        Ok(())
    }

    /// Record a branch's upstream.
    ///
    /// Fails with [`ConfigError::BranchExists`] if the branch is already
    /// configured.
    pub fn add_branch(&mut self, name: &str, remote: &str, merge: &str) -> Result<(), ConfigError> {
        if self.get("branch", Some(name), "remote").is_some()
            || self.get("branch", Some(name), "merge").is_some()
        {
            return Err(ConfigError::BranchExists(name.to_string()));
        }
        self.set("branch", Some(name), "remote", remote);
        self.set("branch", Some(name), "merge", merge);
        Ok(())
    }

    // --- Persistence ---

    /// Serialize to config text, entries grouped under their section
    /// headers in first-appearance order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut sections: Vec<(&BString, Option<&BString>)> = Vec::new();
        for e in &self.entries {
            let key = (&e.section, e.subsection.as_ref());
            if !sections.contains(&key) {
                sections.push(key);
            }
        }

        let mut out = BString::from(Vec::new());
        for (section, subsection) in sections {
            match subsection {
                Some(sub) => {
                    out.push_str(b"[");
                    out.push_str(section);
                    out.push_str(b" \"");
                    out.push_str(escape_subsection(sub.as_bstr()).as_slice());
                    out.push_str(b"\"]\n");
                }
                None => {
                    out.push_str(b"[");
                    out.push_str(section);
                    out.push_str(b"]\n");
                }
            }
            for e in &self.entries {
                if e.section == *section && e.subsection.as_ref() == subsection {
                    out.push_str(b"\t");
                    out.push_str(&e.name);
                    if let Some(ref value) = e.value {
                        out.push_str(b" = ");
                        out.push_str(value);
                    }
                    out.push_str(b"\n");
                }
            }
        }
        out.into()
    }

    /// Write back to the backing file, atomically via its lock file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path.as_ref().ok_or(ConfigError::NoPath)?;
        self.save_to(path)
    }

    /// Write to an explicit path, atomically.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let mut update = AtomicFile::begin(path.as_ref())?;
        update.write_all(&self.serialize())?;
        update.install()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_matches(e: &RawEntry, section: &str, subsection: Option<&str>, name: &str) -> bool {
    e.section == section.to_ascii_lowercase()
        && e.subsection.as_ref().map(|s| s.as_bstr()) == subsection.map(BStr::new)
        && e.name == name.to_ascii_lowercase()
}

fn escape_subsection(sub: &BStr) -> Vec<u8> {
    let mut out = Vec::with_capacity(sub.len());
    for &b in sub.iter() {
        if b == b'"' || b == b'\\' {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}
