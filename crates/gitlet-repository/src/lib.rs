//! Repository facade for gitlet.
//!
//! Binds the object store, reference store, index, and configuration over
//! one metadata directory and implements the high-level plumbing: init and
//! discovery, staging, tree writing, and commits.

mod commit;
mod discover;
mod error;
mod init;
mod stage;

pub use discover::{find_root, is_repository};
pub use error::RepoError;

use std::path::{Path, PathBuf};

use gitlet_config::Config;
use gitlet_hash::ObjectId;
use gitlet_index::Index;
use gitlet_loose::LooseObjectStore;
use gitlet_object::{Commit, Object};
use gitlet_ref::{FilesRefStore, RefName, Reference};

/// An opened repository: a work tree plus its metadata directory.
pub struct Repository {
    /// Work tree root (the directory containing `.git`).
    work_tree: PathBuf,
    /// The metadata directory (`<work_tree>/.git`).
    git_dir: PathBuf,
    /// Loose object store over `<git_dir>/objects`.
    objects: LooseObjectStore,
    /// Reference store over the metadata directory.
    refs: FilesRefStore,
    /// Parsed `<git_dir>/config`.
    config: Config,
    /// Lazily loaded index. `None` means not read yet.
    index: Option<Index>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("work_tree", &self.work_tree)
            .field("git_dir", &self.git_dir)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Initialize a fresh repository at `path` and open it. Re-initializing
    /// an existing repository leaves it untouched.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        std::fs::create_dir_all(path.as_ref())?;
        init::init_repository(path.as_ref())?;
        Self::open(path)
    }

    /// Open the repository whose work tree is `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_tree = std::fs::canonicalize(path.as_ref())
            .map_err(|_| RepoError::NotARepository(path.as_ref().to_path_buf()))?;
        if !discover::is_repository(&work_tree) {
            return Err(RepoError::NotARepository(work_tree));
        }

        let git_dir = work_tree.join(".git");
        let objects = LooseObjectStore::open(git_dir.join("objects"));
        let refs = FilesRefStore::new(&git_dir);
        let config = Config::load(git_dir.join("config"))?;

        Ok(Self {
            work_tree,
            git_dir,
            objects,
            refs,
            config,
            index: None,
        })
    }

    /// Walk upward from `start` and open the first repository found.
    /// Returns `Ok(None)` when no ancestor directory contains `.git`.
    pub fn discover(start: impl AsRef<Path>) -> Result<Option<Self>, RepoError> {
        match discover::find_root(start) {
            Some(root) => Ok(Some(Self::open(root)?)),
            None => Ok(None),
        }
    }

    // --- Paths and subsystems ---

    /// The work tree root.
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// The metadata directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The loose object store.
    pub fn objects(&self) -> &LooseObjectStore {
        &self.objects
    }

    /// The reference store.
    pub fn refs(&self) -> &FilesRefStore {
        &self.refs
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The configuration, mutably. Call [`Config::save`] to persist.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    // --- Index ---

    /// The index, lazily loaded. An absent index file reads as a fresh
    /// empty index.
    pub fn index(&mut self) -> Result<&Index, RepoError> {
        self.ensure_index_loaded()?;
        Ok(self.index.as_ref().expect("index loaded"))
    }

    /// The index, mutably and lazily loaded.
    pub fn index_mut(&mut self) -> Result<&mut Index, RepoError> {
        self.ensure_index_loaded()?;
        Ok(self.index.as_mut().expect("index loaded"))
    }

    /// Persist the in-memory index (no-op if it was never loaded).
    pub fn write_index(&self) -> Result<(), RepoError> {
        if let Some(ref index) = self.index {
            index.write_to(self.index_path())?;
        }
        Ok(())
    }

    /// Drop the cached index and re-read it from disk.
    pub fn reload_index(&mut self) -> Result<&Index, RepoError> {
        self.index = None;
        self.index()
    }

    /// Path of the index file.
    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    fn ensure_index_loaded(&mut self) -> Result<(), RepoError> {
        if self.index.is_none() {
            self.index = Some(Index::load(self.index_path())?);
        }
        Ok(())
    }

    // --- Objects ---

    /// Read an object, mapping absence to [`RepoError::MissingObject`].
    pub fn read_object(&self, oid: &ObjectId) -> Result<Object, RepoError> {
        self.objects
            .read(oid)?
            .ok_or(RepoError::MissingObject(*oid))
    }

    /// Read a commit object.
    pub fn read_commit(&self, oid: &ObjectId) -> Result<Commit, RepoError> {
        match self.read_object(oid)? {
            Object::Commit(commit) => Ok(commit),
            _ => Err(RepoError::NotACommit(*oid)),
        }
    }

    /// Build and store the tree objects for the current index; returns the
    /// root tree OID.
    pub fn write_tree(&mut self) -> Result<ObjectId, RepoError> {
        self.ensure_index_loaded()?;
        let index = self.index.as_ref().expect("index loaded");
        Ok(index.write_tree(&self.objects)?)
    }

    // --- HEAD ---

    /// Resolve `HEAD` to an OID. `Ok(None)` on an unborn branch.
    pub fn head_oid(&self) -> Result<Option<ObjectId>, RepoError> {
        Ok(self.refs.resolve_to_oid(&RefName::head())?)
    }

    /// The current branch's short name, or `None` when `HEAD` is detached.
    pub fn current_branch(&self) -> Result<Option<String>, RepoError> {
        match self.refs.get(&RefName::head())? {
            Some(Reference::Symbolic { target, .. }) => {
                let name = target.as_str();
                let branch = name.strip_prefix("refs/heads/").unwrap_or(name);
                Ok(Some(branch.to_string()))
            }
            _ => Ok(None),
        }
    }

    /// Is `HEAD` pointing at a branch that has no commits yet?
    pub fn is_unborn(&self) -> Result<bool, RepoError> {
        match self.refs.get(&RefName::head())? {
            Some(Reference::Symbolic { target, .. }) => {
                Ok(self.refs.resolve_to_oid(&target)?.is_none())
            }
            Some(Reference::Direct { .. }) => Ok(false),
            None => Ok(true),
        }
    }
}
