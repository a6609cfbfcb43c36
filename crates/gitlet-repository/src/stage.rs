//! Staging operations: adding and removing index entries.

use std::fs;
use std::path::{Path, PathBuf};

use bstr::{BString, ByteSlice};
use gitlet_index::{EntryFlags, IndexEntry, Stage, StatData};
use gitlet_object::{FileMode, ObjectType};
use gitlet_utils::path::normalize_entry_path;

use crate::{RepoError, Repository};

impl Repository {
    /// Stage one file: store its contents as a blob and add or refresh the
    /// index entry.
    ///
    /// An existing entry is updated in place (hash, size, ctime, mtime); a
    /// new entry is fully populated from the file's metadata. The caller is
    /// responsible for persisting the index afterwards.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<(), RepoError> {
        let (abs, rel) = self.entry_paths(path.as_ref())?;

        let data = fs::read(&abs)?;
        let oid = self.objects().write_raw(ObjectType::Blob, &data)?;

        let meta = fs::metadata(&abs)?;
        let stat = StatData::from_metadata(&meta);
        let mode = mode_for(&meta);

        let index = self.index_mut()?;
        if let Some(entry) = index.get_mut(rel.as_bstr(), Stage::Normal) {
            entry.oid = oid;
            entry.stat.size = stat.size;
            entry.stat.ctime_secs = stat.ctime_secs;
            entry.stat.ctime_nsecs = stat.ctime_nsecs;
            entry.stat.mtime_secs = stat.mtime_secs;
            entry.stat.mtime_nsecs = stat.mtime_nsecs;
        } else {
            index.add(IndexEntry {
                path: rel,
                oid,
                mode,
                stage: Stage::Normal,
                stat,
                flags: EntryFlags::default(),
            });
        }

        Ok(())
    }

    /// Stage every regular file under `dir`, skipping the metadata
    /// directory and anything that is not a regular file. Pass `""` or `.`
    /// for the whole work tree. Returns the number of files staged.
    pub fn add_directory(
        &mut self,
        dir: impl AsRef<Path>,
        recursive: bool,
    ) -> Result<usize, RepoError> {
        let dir = dir.as_ref();
        let abs = if dir.as_os_str().is_empty() || dir == Path::new(".") {
            self.work_tree().to_path_buf()
        } else {
            self.to_absolute(dir)?
        };

        let mut staged = 0;
        self.stage_dir_contents(&abs, recursive, &mut staged)?;
        Ok(staged)
    }

    fn stage_dir_contents(
        &mut self,
        dir: &Path,
        recursive: bool,
        staged: &mut usize,
    ) -> Result<(), RepoError> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                if entry.file_name() == ".git" {
                    continue;
                }
                if recursive {
                    self.stage_dir_contents(&path, recursive, staged)?;
                }
            } else if file_type.is_file() {
                self.add_file(&path)?;
                *staged += 1;
            }
            // Symlinks and anything exotic are skipped.
        }
        Ok(())
    }

    /// Drop every index entry whose path matches `path` (any stage).
    /// Silent when nothing matches; the count says how many were removed.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) -> Result<usize, RepoError> {
        let rel = self.to_entry_path(path.as_ref())?;
        let index = self.index_mut()?;
        Ok(index.remove_path(rel.as_bstr()))
    }

    /// Resolve a user-supplied path to (absolute, entry-relative) form.
    fn entry_paths(&self, path: &Path) -> Result<(PathBuf, BString), RepoError> {
        let abs = self.to_absolute(path)?;
        let rel = abs
            .strip_prefix(self.work_tree())
            .map_err(|_| RepoError::PathOutsideWorkTree(path.to_path_buf()))?;
        let entry_path = normalize_entry_path(rel)?;
        Ok((abs, entry_path))
    }

    /// Resolve to the index entry path only (the file need not exist).
    fn to_entry_path(&self, path: &Path) -> Result<BString, RepoError> {
        let (_, rel) = self.entry_paths(path)?;
        Ok(rel)
    }

    /// Absolute form of a path, which must stay inside the work tree.
    fn to_absolute(&self, path: &Path) -> Result<PathBuf, RepoError> {
        if path.is_absolute() {
            if !path.starts_with(self.work_tree()) {
                return Err(RepoError::PathOutsideWorkTree(path.to_path_buf()));
            }
            Ok(path.to_path_buf())
        } else {
            Ok(self.work_tree().join(path))
        }
    }
}

#[cfg(unix)]
fn mode_for(meta: &fs::Metadata) -> FileMode {
    use std::os::unix::fs::PermissionsExt;
    if meta.permissions().mode() & 0o111 != 0 {
        FileMode::Executable
    } else {
        FileMode::Regular
    }
}

#[cfg(not(unix))]
fn mode_for(_meta: &fs::Metadata) -> FileMode {
    FileMode::Regular
}
