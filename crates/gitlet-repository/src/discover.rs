use std::path::{Path, PathBuf};

/// Walk upward from `start` until a directory containing a `.git`
/// subdirectory is found. Returns that containing directory, or `None` once
/// the filesystem root is passed.
pub fn find_root(start: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = std::fs::canonicalize(start.as_ref()).ok()?;
    loop {
        if current.join(".git").is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Does `work_tree` hold a usable metadata directory?
pub fn is_repository(work_tree: &Path) -> bool {
    work_tree.join(".git").join("HEAD").is_file()
}
