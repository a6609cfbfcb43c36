use std::fs;

use gitlet_repository::{find_root, RepoError, Repository};

#[test]
fn init_creates_expected_layout() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let git_dir = repo.git_dir();
    assert!(git_dir.join("refs/heads").is_dir());
    assert!(git_dir.join("refs/tags").is_dir());
    assert!(git_dir.join("objects/pack").is_dir());
    assert!(git_dir.join("branches").is_dir());
    assert!(git_dir.join("description").is_file());
}

#[test]
fn init_writes_exact_head() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let head = fs::read(repo.git_dir().join("HEAD")).unwrap();
    assert_eq!(head, b"ref: refs/heads/master\n");
}

#[test]
fn init_writes_core_config() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let core = repo.config().core().unwrap();
    assert_eq!(core.repository_format_version, 0);
    assert!(!core.filemode);
    assert!(!core.bare);
}

#[test]
fn reinit_is_a_safe_noop() {
    let dir = tempfile::tempdir().unwrap();
    Repository::init(dir.path()).unwrap();

    // Point HEAD somewhere else, then re-init: nothing is overwritten.
    let head_path = dir.path().join(".git/HEAD");
    fs::write(&head_path, "ref: refs/heads/other\n").unwrap();

    Repository::init(dir.path()).unwrap();
    assert_eq!(fs::read(&head_path).unwrap(), b"ref: refs/heads/other\n");
}

#[test]
fn open_rejects_non_repository() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Repository::open(dir.path()),
        Err(RepoError::NotARepository(_))
    ));
}

#[test]
fn open_rejects_missing_path() {
    assert!(Repository::open("/no/such/directory/anywhere").is_err());
}

#[test]
fn discover_from_nested_directory() {
    let dir = tempfile::tempdir().unwrap();
    Repository::init(dir.path()).unwrap();
    fs::create_dir_all(dir.path().join("src/deep")).unwrap();

    let repo = Repository::discover(dir.path().join("src/deep"))
        .unwrap()
        .expect("repository above nested dir");
    assert_eq!(repo.work_tree(), fs::canonicalize(dir.path()).unwrap());

    assert_eq!(
        find_root(dir.path().join("src/deep")).unwrap(),
        fs::canonicalize(dir.path()).unwrap()
    );
}

#[test]
fn discover_outside_any_repository() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Repository::discover(dir.path()).unwrap().is_none());
}

#[test]
fn fresh_repository_is_unborn_on_master() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = Repository::init(dir.path()).unwrap();

    assert!(repo.is_unborn().unwrap());
    assert_eq!(repo.head_oid().unwrap(), None);
    assert_eq!(repo.current_branch().unwrap().as_deref(), Some("master"));
    assert!(repo.index().unwrap().is_empty());
}
