//! Commit graph traversal for gitlet.
//!
//! The operations here walk the parent edges of the commit DAG: measuring
//! how far a tip is ahead of an ancestor, and how many commits the current
//! branch would push to its configured upstream.

mod ahead;

pub use ahead::{count_till_ancestor, num_changes_to_push};

/// Errors from revision walking.
#[derive(Debug, thiserror::Error)]
pub enum RevWalkError {
    #[error(transparent)]
    Repo(#[from] gitlet_repository::RepoError),

    #[error(transparent)]
    Ref(#[from] gitlet_ref::RefError),
}
