pub(crate) mod loose;
pub mod packed;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use gitlet_hash::ObjectId;

use crate::error::RefError;
use crate::name::RefName;
use crate::Reference;

use self::packed::PackedRefs;

/// Maximum number of symbolic hops a resolution chain may take.
const MAX_SYMREF_DEPTH: usize = 10;

/// Files-backend ref store (loose refs + read-only packed-refs).
///
/// Loose refs are individual files under the metadata directory; the
/// optional `packed-refs` file is consulted when no loose file exists.
/// Loose always wins on conflict. Updates always write loose files,
/// atomically via lock file + rename.
pub struct FilesRefStore {
    git_dir: PathBuf,
}

impl FilesRefStore {
    /// Create a files-based ref store over the given metadata directory.
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    /// The metadata directory path.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Look up a single ref: loose file first, then packed-refs.
    pub fn get(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        match loose::read_loose_ref(&self.git_dir, name)? {
            Some(r) => Ok(Some(r)),
            None => {
                let packed = PackedRefs::load(&self.git_dir)?;
                Ok(packed.find(name).map(|pr| Reference::Direct {
                    name: pr.name.clone(),
                    target: pr.oid,
                }))
            }
        }
    }

    /// Write a reference. Always writes a loose file, shadowing any packed
    /// entry of the same name.
    pub fn put(&self, reference: &Reference) -> Result<(), RefError> {
        match reference {
            Reference::Direct { name, target } => {
                loose::write_loose_ref(&self.git_dir, name, target)
            }
            Reference::Symbolic { name, target } => {
                loose::write_symbolic_ref(&self.git_dir, name, target)
            }
        }
    }

    /// Write a direct ref.
    pub fn put_hash(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        loose::write_loose_ref(&self.git_dir, name, oid)
    }

    /// Write a symbolic ref.
    pub fn put_symbolic(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        loose::write_symbolic_ref(&self.git_dir, name, target)
    }

    /// Delete the loose file for a ref. A packed entry with the same name is
    /// left alone; deleting an only-packed ref is a silent no-op.
    pub fn delete(&self, name: &RefName) -> Result<(), RefError> {
        loose::delete_loose_ref(&self.git_dir, name)
    }

    /// Enumerate refs under a prefix: the union of loose and packed refs,
    /// loose winning on conflict, sorted by full name.
    pub fn list(&self, prefix: Option<&str>) -> Result<Vec<Reference>, RefError> {
        let loose_names = loose::enumerate_loose_refs(&self.git_dir, prefix)?;
        let mut seen: HashSet<RefName> = HashSet::new();
        let mut refs: Vec<Reference> = Vec::new();

        for name in loose_names {
            // A file may vanish between enumerate and read.
            if let Some(r) = loose::read_loose_ref(&self.git_dir, &name)? {
                seen.insert(name);
                refs.push(r);
            }
        }

        let packed = PackedRefs::load(&self.git_dir)?;
        for pr in packed.refs() {
            if seen.contains(&pr.name) {
                continue;
            }
            if let Some(p) = prefix {
                if !pr.name.as_str().starts_with(p) {
                    continue;
                }
            }
            refs.push(Reference::Direct {
                name: pr.name.clone(),
                target: pr.oid,
            });
        }

        refs.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(refs)
    }

    /// Resolve a ref to its terminal direct reference.
    ///
    /// A direct ref resolves to itself. Symbolic refs are followed through
    /// the chain; a missing link is `NotFound`, a revisited name is
    /// `CycleDetected`, and more than `MAX_SYMREF_DEPTH` hops is `TooDeep`.
    pub fn resolve(&self, name: &RefName) -> Result<Reference, RefError> {
        let mut visited: HashSet<RefName> = HashSet::new();
        let mut current = name.clone();
        let mut hops = 0usize;

        loop {
            if !visited.insert(current.clone()) {
                return Err(RefError::CycleDetected(current.to_string()));
            }

            let reference = self
                .get(&current)?
                .ok_or_else(|| RefError::NotFound(current.to_string()))?;

            match reference {
                Reference::Direct { .. } => return Ok(reference),
                Reference::Symbolic { target, .. } => {
                    hops += 1;
                    if hops > MAX_SYMREF_DEPTH {
                        return Err(RefError::TooDeep(name.to_string(), MAX_SYMREF_DEPTH));
                    }
                    current = target;
                }
            }
        }
    }

    /// Resolve a ref to an OID, tolerating missing refs.
    ///
    /// Returns `Ok(None)` when the ref or any link of its chain does not
    /// exist (e.g. `HEAD` on an unborn branch). Cycle and depth failures
    /// are still errors.
    pub fn resolve_to_oid(&self, name: &RefName) -> Result<Option<ObjectId>, RefError> {
        match self.resolve(name) {
            Ok(reference) => Ok(reference.target_oid()),
            Err(RefError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn oid(hex_char: char) -> ObjectId {
        ObjectId::from_hex(&hex_char.to_string().repeat(40)).unwrap()
    }

    fn store() -> (tempfile::TempDir, FilesRefStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesRefStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn put_then_get() {
        let (_dir, store) = store();
        let name = RefName::new("refs/heads/master").unwrap();
        store.put_hash(&name, &oid('a')).unwrap();

        let r = store.get(&name).unwrap().unwrap();
        assert_eq!(r.target_oid(), Some(oid('a')));
    }

    #[test]
    fn get_falls_back_to_packed() {
        let (dir, store) = store();
        fs::write(
            dir.path().join("packed-refs"),
            format!("{} refs/heads/packed-only\n", oid('b').to_hex()),
        )
        .unwrap();

        let name = RefName::new("refs/heads/packed-only").unwrap();
        let r = store.get(&name).unwrap().unwrap();
        assert_eq!(r.target_oid(), Some(oid('b')));
    }

    #[test]
    fn loose_wins_over_packed() {
        let (dir, store) = store();
        let name = RefName::new("refs/heads/master").unwrap();
        fs::write(
            dir.path().join("packed-refs"),
            format!("{} refs/heads/master\n", oid('b').to_hex()),
        )
        .unwrap();
        store.put_hash(&name, &oid('a')).unwrap();

        let r = store.get(&name).unwrap().unwrap();
        assert_eq!(r.target_oid(), Some(oid('a')));

        let listed = store.list(Some("refs/heads/")).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].target_oid(), Some(oid('a')));
    }

    #[test]
    fn list_unions_and_sorts() {
        let (dir, store) = store();
        store
            .put_hash(&RefName::new("refs/heads/zz").unwrap(), &oid('a'))
            .unwrap();
        fs::write(
            dir.path().join("packed-refs"),
            format!("{} refs/heads/aa\n", oid('b').to_hex()),
        )
        .unwrap();

        let listed = store.list(Some("refs/heads/")).unwrap();
        let names: Vec<&str> = listed.iter().map(|r| r.name().as_str()).collect();
        assert_eq!(names, ["refs/heads/aa", "refs/heads/zz"]);
    }

    #[test]
    fn delete_removes_loose_only() {
        let (dir, store) = store();
        let name = RefName::new("refs/heads/master").unwrap();
        fs::write(
            dir.path().join("packed-refs"),
            format!("{} refs/heads/master\n", oid('b').to_hex()),
        )
        .unwrap();
        store.put_hash(&name, &oid('a')).unwrap();

        store.delete(&name).unwrap();
        // The packed entry shines through again.
        let r = store.get(&name).unwrap().unwrap();
        assert_eq!(r.target_oid(), Some(oid('b')));
    }

    #[test]
    fn resolve_direct_returns_itself() {
        let (_dir, store) = store();
        let name = RefName::new("refs/heads/master").unwrap();
        store.put_hash(&name, &oid('a')).unwrap();

        let r = store.resolve(&name).unwrap();
        assert_eq!(r.name(), &name);
        assert_eq!(r.target_oid(), Some(oid('a')));
    }

    #[test]
    fn resolve_follows_symbolic_chain() {
        let (_dir, store) = store();
        let master = RefName::new("refs/heads/master").unwrap();
        store.put_hash(&master, &oid('a')).unwrap();
        store.put_symbolic(&RefName::head(), &master).unwrap();

        let r = store.resolve(&RefName::head()).unwrap();
        assert_eq!(r.name(), &master);
        assert_eq!(r.target_oid(), Some(oid('a')));
    }

    #[test]
    fn resolve_missing_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.resolve(&RefName::new("refs/heads/ghost").unwrap()),
            Err(RefError::NotFound(_))
        ));
    }

    #[test]
    fn resolve_dangling_symref_is_not_found() {
        let (_dir, store) = store();
        store
            .put_symbolic(&RefName::head(), &RefName::new("refs/heads/unborn").unwrap())
            .unwrap();
        assert!(matches!(
            store.resolve(&RefName::head()),
            Err(RefError::NotFound(_))
        ));
        assert_eq!(store.resolve_to_oid(&RefName::head()).unwrap(), None);
    }

    #[test]
    fn resolve_detects_cycle() {
        let (_dir, store) = store();
        let a = RefName::new("refs/heads/a").unwrap();
        let b = RefName::new("refs/heads/b").unwrap();
        store.put_symbolic(&a, &b).unwrap();
        store.put_symbolic(&b, &a).unwrap();

        assert!(matches!(
            store.resolve(&a),
            Err(RefError::CycleDetected(_))
        ));
    }

    #[test]
    fn resolve_self_cycle() {
        let (_dir, store) = store();
        let a = RefName::new("refs/heads/a").unwrap();
        store.put_symbolic(&a, &a).unwrap();
        assert!(matches!(store.resolve(&a), Err(RefError::CycleDetected(_))));
    }

    #[test]
    fn resolve_caps_chain_depth() {
        let (_dir, store) = store();
        // Chain of 12 distinct symbolic refs, ending in a direct ref.
        for i in 0..12 {
            let from = RefName::new(format!("refs/heads/chain-{i}")).unwrap();
            let to = RefName::new(format!("refs/heads/chain-{}", i + 1)).unwrap();
            store.put_symbolic(&from, &to).unwrap();
        }
        store
            .put_hash(&RefName::new("refs/heads/chain-12").unwrap(), &oid('a'))
            .unwrap();

        assert!(matches!(
            store.resolve(&RefName::new("refs/heads/chain-0").unwrap()),
            Err(RefError::TooDeep(_, _))
        ));
    }
}
