//! The staging index for gitlet.
//!
//! Provides reading, writing, and manipulation of the binary index file
//! (version 2), plus the reconstruction of hierarchical tree objects from
//! the flat entry list.

pub mod entry;
mod read;
mod tree_builder;
mod write;

use std::path::{Path, PathBuf};

use bstr::BStr;
use gitlet_hash::ObjectId;
use gitlet_loose::LooseObjectStore;

pub use entry::{EntryFlags, IndexEntry, StatData};
pub use tree_builder::write_tree;

/// Errors from index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid index header: {0}")]
    InvalidHeader(String),

    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    #[error("index checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid index entry at offset {offset}: {reason}")]
    InvalidEntry { offset: usize, reason: String },

    #[error("mandatory index extension not recognized: {signature}")]
    UnknownExtension { signature: String },

    #[error("truncated index extension: {signature}")]
    TruncatedExtension { signature: String },

    #[error("lock failed: {path}")]
    LockFailed { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Loose(#[from] gitlet_loose::LooseError),
}

/// Merge stage of an index entry (the two stage bits in the entry flags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Normal entry (stage 0).
    Normal,
    /// Base version in a merge conflict (stage 1).
    Base,
    /// Ours version in a merge conflict (stage 2).
    Ours,
    /// Theirs version in a merge conflict (stage 3).
    Theirs,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        match self {
            Stage::Normal => 0,
            Stage::Base => 1,
            Stage::Ours => 2,
            Stage::Theirs => 3,
        }
    }

    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            0 => Some(Stage::Normal),
            1 => Some(Stage::Base),
            2 => Some(Stage::Ours),
            3 => Some(Stage::Theirs),
            _ => None,
        }
    }
}

/// The staging index: a flat list of entries sorted by `(path, stage)`.
#[derive(Debug, Default)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    /// Create a new empty (version 2) index.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Load the index from a file. An absent file yields a fresh empty
    /// index; a present but malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        match std::fs::File::open(path.as_ref()) {
            Ok(file) => {
                let data = unsafe { memmap2::Mmap::map(&file) }?;
                read::parse_index(&data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(IndexError::Io(e)),
        }
    }

    /// Parse an index from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, IndexError> {
        read::parse_index(data)
    }

    /// Write the index to a file, atomically via lock file + rename.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        write::write_index(self, path.as_ref())
    }

    /// Serialize the index to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        write::serialize_index(self)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by path and stage.
    pub fn get(&self, path: &BStr, stage: Stage) -> Option<&IndexEntry> {
        self.entries
            .iter()
            .find(|e| e.path[..] == path[..] && e.stage == stage)
    }

    /// Get an entry mutably by path and stage.
    pub fn get_mut(&mut self, path: &BStr, stage: Stage) -> Option<&mut IndexEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.path[..] == path[..] && e.stage == stage)
    }

    /// Add or replace an entry, keeping `(path, stage)` order.
    pub fn add(&mut self, entry: IndexEntry) {
        self.entries
            .retain(|e| !(e.path == entry.path && e.stage == entry.stage));
        let pos = self
            .entries
            .binary_search_by(|e| cmp_entries(e, &entry))
            .unwrap_or_else(|pos| pos);
        self.entries.insert(pos, entry);
    }

    /// Remove every entry with the given path, any stage. Returns how many
    /// entries were dropped (0 when nothing matched).
    pub fn remove_path(&mut self, path: &BStr) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.path[..] != path[..]);
        before - self.entries.len()
    }

    /// Iterate entries in `(path, stage)` order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Write the tree objects implied by the stage-0 entries and return the
    /// root tree OID.
    pub fn write_tree(&self, store: &LooseObjectStore) -> Result<ObjectId, IndexError> {
        tree_builder::write_tree(self, store)
    }
}

/// Sort order for index entries: by path bytes, then by stage.
fn cmp_entries(a: &IndexEntry, b: &IndexEntry) -> std::cmp::Ordering {
    a.path
        .cmp(&b.path)
        .then(a.stage.as_u8().cmp(&b.stage.as_u8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::BString;
    use gitlet_object::FileMode;

    fn entry(path: &str) -> IndexEntry {
        IndexEntry {
            path: BString::from(path),
            oid: ObjectId::NULL,
            mode: FileMode::Regular,
            stage: Stage::Normal,
            stat: StatData::default(),
            flags: EntryFlags::default(),
        }
    }

    #[test]
    fn add_keeps_sorted_order() {
        let mut index = Index::new();
        index.add(entry("zebra"));
        index.add(entry("alpha"));
        index.add(entry("middle"));

        let paths: Vec<String> = index.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, ["alpha", "middle", "zebra"]);
    }

    #[test]
    fn add_replaces_same_path_and_stage() {
        let mut index = Index::new();
        index.add(entry("file"));
        let mut updated = entry("file");
        updated.stat.size = 42;
        index.add(updated);

        assert_eq!(index.len(), 1);
        assert_eq!(index.iter().next().unwrap().stat.size, 42);
    }

    #[test]
    fn stage_breaks_path_ties() {
        let mut index = Index::new();
        let mut theirs = entry("file");
        theirs.stage = Stage::Theirs;
        let mut base = entry("file");
        base.stage = Stage::Base;
        index.add(theirs);
        index.add(base);

        let stages: Vec<u8> = index.iter().map(|e| e.stage.as_u8()).collect();
        assert_eq!(stages, [1, 3]);
    }

    #[test]
    fn remove_path_reports_count() {
        let mut index = Index::new();
        index.add(entry("a"));
        let mut conflicted = entry("a");
        conflicted.stage = Stage::Ours;
        index.add(conflicted);
        index.add(entry("b"));

        assert_eq!(index.remove_path(BStr::new("a")), 2);
        assert_eq!(index.remove_path(BStr::new("a")), 0);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = Index::load(dir.path().join("index")).unwrap();
        assert!(index.is_empty());
    }
}
