use std::cmp::Ordering;

use bstr::BString;
use gitlet_hash::ObjectId;
use gitlet_object::{FileMode, Tree, TreeEntry};

fn entry(name: &str, mode: FileMode) -> TreeEntry {
    TreeEntry {
        mode,
        name: BString::from(name),
        oid: ObjectId::NULL,
    }
}

fn file(name: &str) -> TreeEntry {
    entry(name, FileMode::Regular)
}

fn dir(name: &str) -> TreeEntry {
    entry(name, FileMode::Dir)
}

#[test]
fn dir_sorts_as_if_trailing_slash() {
    // "foo/" vs "foo.c": '/' (0x2F) > '.' (0x2E)
    assert_eq!(
        TreeEntry::cmp_entries(&dir("foo"), &file("foo.c")),
        Ordering::Greater
    );
}

#[test]
fn dir_sorts_after_hyphenated() {
    // "foo/" vs "foo-bar": '/' (0x2F) > '-' (0x2D)
    assert_eq!(
        TreeEntry::cmp_entries(&dir("foo"), &file("foo-bar")),
        Ordering::Greater
    );
}

#[test]
fn dir_sorts_before_zero() {
    // "foo/" vs "foo0": '/' (0x2F) < '0' (0x30)
    assert_eq!(
        TreeEntry::cmp_entries(&dir("foo"), &file("foo0")),
        Ordering::Less
    );
}

#[test]
fn same_name_file_before_dir() {
    // file gets NUL at the end, dir gets '/'
    assert_eq!(
        TreeEntry::cmp_entries(&file("abc"), &dir("abc")),
        Ordering::Less
    );
}

#[test]
fn identical_entries_equal() {
    assert_eq!(
        TreeEntry::cmp_entries(&file("README"), &file("README")),
        Ordering::Equal
    );
    assert_eq!(
        TreeEntry::cmp_entries(&dir("src"), &dir("src")),
        Ordering::Equal
    );
}

#[test]
fn plain_prefix_sorts_first() {
    assert_eq!(
        TreeEntry::cmp_entries(&file("ab"), &file("abc")),
        Ordering::Less
    );
}

#[test]
fn dir_prefix_of_file() {
    // "ab/" vs "abc": '/' (0x2F) < 'c' (0x63)
    assert_eq!(
        TreeEntry::cmp_entries(&dir("ab"), &file("abc")),
        Ordering::Less
    );
}

#[test]
fn gitlink_is_not_a_directory() {
    // Gitlinks (mode 160000) compare like files, no implicit '/'.
    assert_eq!(
        TreeEntry::cmp_entries(&entry("sub", FileMode::Gitlink), &file("sub")),
        Ordering::Equal
    );
    assert_eq!(
        TreeEntry::cmp_entries(&entry("foo", FileMode::Gitlink), &dir("foo")),
        Ordering::Less
    );
}

#[test]
fn executable_and_symlink_sort_like_files() {
    assert_eq!(
        TreeEntry::cmp_entries(&file("run.sh"), &entry("run.sh", FileMode::Executable)),
        Ordering::Equal
    );
    assert_eq!(
        TreeEntry::cmp_entries(&file("link"), &entry("link", FileMode::Symlink)),
        Ordering::Equal
    );
}

#[test]
fn sorted_tree_matches_git_order() {
    let mut tree = Tree {
        entries: vec![file("foo.c"), dir("foo"), file("foo-bar"), file("foo0")],
    };
    tree.sort();

    // "foo-bar" < "foo.c" < "foo" (as "foo/") < "foo0"
    let names: Vec<String> = tree.iter().map(|e| e.name.to_string()).collect();
    assert_eq!(names, ["foo-bar", "foo.c", "foo", "foo0"]);

    // The sorted order survives a serialize/parse cycle untouched.
    let parsed = Tree::parse(&tree.serialize_payload()).unwrap();
    assert_eq!(parsed, tree);
}

#[test]
fn unsorted_tree_serializes_unsorted() {
    let tree = Tree {
        entries: vec![file("z"), file("a")],
    };
    let parsed = Tree::parse(&tree.serialize_payload()).unwrap();
    assert_eq!(parsed.entries[0].name, "z");
    assert_eq!(parsed.entries[1].name, "a");
}
