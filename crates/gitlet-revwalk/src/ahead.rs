use std::collections::{HashSet, VecDeque};

use gitlet_hash::ObjectId;
use gitlet_ref::RefName;
use gitlet_repository::Repository;

use crate::RevWalkError;

/// Count commits from `from` back to `ancestor` with a breadth-first walk
/// over parent edges.
///
/// `from` itself is counted, `ancestor` is not: two commits one apart give
/// 1, and `count_till_ancestor(x, x)` is 0. Returns -1 when `ancestor` is
/// not reachable, and also when any commit on the walk cannot be read;
/// a corrupted or pruned history has no meaningful distance.
pub fn count_till_ancestor(repo: &Repository, from: &ObjectId, ancestor: &ObjectId) -> i64 {
    let mut queue: VecDeque<ObjectId> = VecDeque::new();
    let mut seen: HashSet<ObjectId> = HashSet::new();
    queue.push_back(*from);
    seen.insert(*from);

    let mut count: i64 = 0;
    while let Some(oid) = queue.pop_front() {
        if oid == *ancestor {
            return count;
        }
        count += 1;

        let commit = match repo.read_commit(&oid) {
            Ok(commit) => commit,
            Err(_) => return -1,
        };
        for parent in &commit.parents {
            if seen.insert(*parent) {
                queue.push_back(*parent);
            }
        }
    }

    -1
}

/// How many commits the current branch is ahead of its upstream.
///
/// The upstream is `refs/remotes/<branch.remote>/<branch-name>` where
/// `<branch-name>` comes from the `branch.<name>.merge` ref. The count is 0
/// when there is no current branch, no upstream configuration, either tip
/// is missing, or both tips are equal; an unreachable upstream also clamps
/// to 0.
pub fn num_changes_to_push(repo: &Repository) -> Result<u64, RevWalkError> {
    let Some(branch) = repo.current_branch()? else {
        return Ok(0);
    };
    let Some(branch_config) = repo.config().branch(&branch) else {
        return Ok(0);
    };

    let merge_name = branch_config
        .merge
        .strip_prefix("refs/heads/")
        .unwrap_or(&branch_config.merge);

    let local = repo.refs().resolve_to_oid(&RefName::branch(&branch)?)?;
    let upstream = repo
        .refs()
        .resolve_to_oid(&RefName::remote_branch(&branch_config.remote, merge_name)?)?;

    match (local, upstream) {
        (Some(local), Some(upstream)) if local != upstream => {
            Ok(count_till_ancestor(repo, &local, &upstream).max(0) as u64)
        }
        _ => Ok(0),
    }
}
