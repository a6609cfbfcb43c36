//! The commit operation.

use bstr::BString;
use gitlet_hash::ObjectId;
use gitlet_object::{Commit, Object};
use gitlet_ref::{RefName, Reference};
use gitlet_utils::date::Signature;

use crate::{RepoError, Repository};

impl Repository {
    /// Create a commit from the current index.
    ///
    /// With `stage_all`, every regular file in the work tree is staged
    /// first and the updated index is persisted. The new commit's sole
    /// parent is whatever `HEAD` resolves to, when that is an existing
    /// commit; otherwise this is a root commit. The committer defaults to
    /// the author.
    ///
    /// Afterwards the current branch ref is moved to the new commit; with a
    /// detached `HEAD`, `HEAD` itself is overwritten.
    pub fn commit(
        &mut self,
        message: impl Into<BString>,
        author: Signature,
        committer: Option<Signature>,
        stage_all: bool,
    ) -> Result<ObjectId, RepoError> {
        self.index()?;

        if stage_all {
            self.add_directory("", true)?;
            self.write_index()?;
        }

        let tree = self.write_tree()?;

        let parents = match self.refs().resolve_to_oid(&RefName::head())? {
            Some(oid) => match self.objects().read(&oid) {
                Ok(Some(Object::Commit(_))) => vec![oid],
                _ => Vec::new(),
            },
            None => Vec::new(),
        };

        let committer = committer.unwrap_or_else(|| author.clone());
        let commit = Commit {
            tree,
            parents,
            author,
            committer,
            encoding: None,
            gpgsig: None,
            extra_headers: Vec::new(),
            message: message.into(),
        };

        let oid = self.objects().write(&Object::Commit(commit))?;

        match self.refs().get(&RefName::head())? {
            Some(Reference::Symbolic { target, .. }) => {
                self.refs().put_hash(&target, &oid)?;
            }
            // Detached (or somehow absent) HEAD: move HEAD itself.
            _ => {
                self.refs().put_hash(&RefName::head(), &oid)?;
            }
        }

        Ok(oid)
    }
}
