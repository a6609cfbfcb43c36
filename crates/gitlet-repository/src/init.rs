use std::fs;
use std::path::{Path, PathBuf};

use crate::RepoError;

/// Contents of the `config` file a fresh repository starts with.
const DEFAULT_CONFIG: &str =
    "[core]\n\trepositoryformatversion = 0\n\tfilemode = false\n\tbare = false\n";

/// Contents of the default `description` file.
const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// Initialize the metadata directory for a repository at `work_tree`.
///
/// Creates:
/// - `.git/HEAD` pointing at `refs/heads/master`
/// - `.git/config` with the minimal `[core]` section
/// - `.git/description`
/// - `.git/branches/`, `.git/objects/pack/`, `.git/refs/heads/`,
///   `.git/refs/tags/`
///
/// Re-running init on an existing repository is a safe no-op; nothing is
/// overwritten.
pub(crate) fn init_repository(work_tree: &Path) -> Result<PathBuf, RepoError> {
    let git_dir = work_tree.join(".git");

    if git_dir.join("HEAD").is_file() {
        return Ok(git_dir);
    }

    fs::create_dir_all(git_dir.join("branches"))?;
    fs::create_dir_all(git_dir.join("objects").join("pack"))?;
    fs::create_dir_all(git_dir.join("refs").join("heads"))?;
    fs::create_dir_all(git_dir.join("refs").join("tags"))?;

    fs::write(git_dir.join("HEAD"), "ref: refs/heads/master\n")?;
    fs::write(git_dir.join("config"), DEFAULT_CONFIG)?;
    fs::write(git_dir.join("description"), DEFAULT_DESCRIPTION)?;

    Ok(git_dir)
}
