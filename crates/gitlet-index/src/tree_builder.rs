//! Flat index → hierarchical tree reconstruction.
//!
//! The entry list implies a set of directories; each directory becomes one
//! tree object. Directories are filled with leaves first (files with known
//! hashes, subdirectories as placeholders), then written deepest-first so
//! every placeholder can be replaced by an already-computed child hash
//! before its parent is serialized. The root (`""`) is written last.

use std::collections::HashMap;

use bstr::{BStr, BString, ByteSlice};
use gitlet_hash::ObjectId;
use gitlet_loose::LooseObjectStore;
use gitlet_object::{FileMode, ObjectType, Tree, TreeEntry};

use crate::{Index, IndexError, Stage};

/// A leaf of an in-progress tree. Subdirectory leaves start with no hash;
/// it is filled in once the child tree has been written.
struct PendingLeaf {
    mode: FileMode,
    name: BString,
    oid: Option<ObjectId>,
}

/// Build and write the tree objects implied by the index's stage-0 entries.
/// Returns the root tree OID.
///
/// The result depends only on the set of entries, not their order: both the
/// directory processing order and the leaf order within each tree are fully
/// determined.
pub fn write_tree(index: &Index, store: &LooseObjectStore) -> Result<ObjectId, IndexError> {
    // Directory path → its leaves so far. The root is the empty path.
    let mut trees: HashMap<BString, Vec<PendingLeaf>> = HashMap::new();
    trees.insert(BString::default(), Vec::new());

    for entry in index.iter().filter(|e| e.stage == Stage::Normal) {
        let (dir, file_name) = split_last(entry.path.as_bstr());
        ensure_directory(&mut trees, dir)?;

        let leaves = trees
            .get_mut(dir)
            .ok_or_else(|| invalid_path(&entry.path, "directory chain not built"))?;
        leaves.push(PendingLeaf {
            mode: entry.mode,
            name: BString::from(file_name),
            oid: Some(entry.oid),
        });
    }

    // Deepest directories first, lexicographic within a depth; the root has
    // depth 0 and is always last.
    let mut dirs: Vec<BString> = trees.keys().cloned().collect();
    dirs.sort_by(|a, b| {
        depth(b.as_bstr())
            .cmp(&depth(a.as_bstr()))
            .then_with(|| a.cmp(b))
    });

    let mut written: HashMap<BString, ObjectId> = HashMap::new();

    for dir in &dirs {
        let mut leaves = trees.remove(dir).unwrap_or_default();

        for leaf in &mut leaves {
            if leaf.oid.is_none() {
                let child = join(dir.as_bstr(), leaf.name.as_bstr());
                let child_oid = written
                    .get(&child)
                    .copied()
                    .ok_or_else(|| invalid_path(&child, "child tree not yet written"))?;
                leaf.oid = Some(child_oid);
            }
        }

        let mut tree = Tree {
            entries: leaves
                .into_iter()
                .map(|leaf| {
                    let oid = leaf
                        .oid
                        .ok_or_else(|| invalid_path(&leaf.name, "leaf with no hash"))?;
                    Ok(TreeEntry {
                        mode: leaf.mode,
                        name: leaf.name,
                        oid,
                    })
                })
                .collect::<Result<Vec<_>, IndexError>>()?,
        };
        tree.sort();

        let oid = store.write_raw(ObjectType::Tree, &tree.serialize_payload())?;
        written.insert(dir.clone(), oid);
    }

    written
        .get(BStr::new(b""))
        .copied()
        .ok_or_else(|| invalid_path(BStr::new(b""), "root tree missing"))
}

/// Make sure `dir` and every ancestor exist in the tree map, and that each
/// ancestor carries a placeholder leaf for its child directory.
fn ensure_directory(
    trees: &mut HashMap<BString, Vec<PendingLeaf>>,
    dir: &BStr,
) -> Result<(), IndexError> {
    if dir.is_empty() {
        return Ok(());
    }

    // Walk the chain root-ward: "sub/deep" visits ("", "sub") then
    // ("sub", "sub/deep").
    let mut prefix_end = 0usize;
    loop {
        let next_sep = dir[prefix_end..]
            .find_byte(b'/')
            .map(|p| p + prefix_end)
            .unwrap_or(dir.len());
        let parent = BString::from(&dir[..prefix_end.saturating_sub(1)]);
        let child = BString::from(&dir[..next_sep]);
        let child_name = BString::from(&dir[prefix_end..next_sep]);

        if child_name.is_empty() {
            return Err(invalid_path(dir, "empty path component"));
        }

        trees.entry(child.clone()).or_default();

        let parent_leaves = trees
            .get_mut(&parent)
            .ok_or_else(|| invalid_path(dir, "parent directory missing"))?;
        if !parent_leaves
            .iter()
            .any(|leaf| leaf.mode.is_dir() && leaf.name == child_name)
        {
            parent_leaves.push(PendingLeaf {
                mode: FileMode::Dir,
                name: child_name,
                oid: None,
            });
        }

        if next_sep == dir.len() {
            break;
        }
        prefix_end = next_sep + 1;
    }

    Ok(())
}

/// Split off the final path component: `"sub/deep/c.txt"` →
/// `("sub/deep", "c.txt")`.
fn split_last(path: &BStr) -> (&BStr, &BStr) {
    match path.rfind_byte(b'/') {
        Some(pos) => (path[..pos].as_bstr(), path[pos + 1..].as_bstr()),
        None => (BStr::new(b""), path),
    }
}

/// Number of components in a directory path; the root is 0.
fn depth(dir: &BStr) -> usize {
    if dir.is_empty() {
        0
    } else {
        dir.split_str(b"/").count()
    }
}

fn join(dir: &BStr, name: &BStr) -> BString {
    if dir.is_empty() {
        BString::from(name)
    } else {
        let mut out = BString::from(dir);
        out.push(b'/');
        out.extend_from_slice(name);
        out
    }
}

fn invalid_path<P: AsRef<[u8]>>(path: P, reason: &str) -> IndexError {
    IndexError::InvalidEntry {
        offset: 0,
        reason: format!(
            "{} ('{}')",
            reason,
            String::from_utf8_lossy(path.as_ref())
        ),
    }
}
