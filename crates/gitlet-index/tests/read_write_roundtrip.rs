//! Round-trip and corruption tests for the version 2 index codec.

use bstr::{BStr, BString};
use gitlet_hash::{Hasher, ObjectId};
use gitlet_index::{EntryFlags, Index, IndexEntry, IndexError, Stage, StatData};
use gitlet_object::FileMode;

fn entry(path: &str, oid_char: char) -> IndexEntry {
    IndexEntry {
        path: BString::from(path),
        oid: ObjectId::from_hex(&oid_char.to_string().repeat(40)).unwrap(),
        mode: FileMode::Regular,
        stage: Stage::Normal,
        stat: StatData {
            ctime_secs: 1_700_000_000,
            ctime_nsecs: 123,
            mtime_secs: 1_700_000_001,
            mtime_nsecs: 456,
            dev: 64,
            ino: 99,
            uid: 1000,
            gid: 1000,
            size: 7,
        },
        flags: EntryFlags::default(),
    }
}

fn sample_index() -> Index {
    let mut index = Index::new();
    index.add(entry("sub/b.txt", 'b'));
    index.add(entry("a.txt", 'a'));
    index.add(entry("sub/deep/c.txt", 'c'));
    index
}

/// Re-stamp the trailing checksum after mutating serialized bytes.
fn fix_checksum(data: &mut Vec<u8>) {
    let content_len = data.len() - 20;
    let checksum = Hasher::digest(&data[..content_len]);
    data.truncate(content_len);
    data.extend_from_slice(checksum.as_bytes());
}

#[test]
fn serialize_parse_roundtrip() {
    let index = sample_index();
    let data = index.serialize();
    let parsed = Index::parse(&data).unwrap();

    assert_eq!(parsed.len(), index.len());
    for (a, b) in index.iter().zip(parsed.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn entries_stored_sorted_by_path() {
    let index = sample_index();
    let parsed = Index::parse(&index.serialize()).unwrap();
    let paths: Vec<String> = parsed.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, ["a.txt", "sub/b.txt", "sub/deep/c.txt"]);
}

#[test]
fn file_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index");

    let index = sample_index();
    index.write_to(&path).unwrap();
    assert!(!dir.path().join("index.lock").exists());

    let loaded = Index::load(&path).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(
        loaded.get(BStr::new(b"a.txt"), Stage::Normal).unwrap().oid,
        ObjectId::from_hex(&"a".repeat(40)).unwrap()
    );
}

#[test]
fn empty_index_roundtrip() {
    let index = Index::new();
    let data = index.serialize();
    // Header (12) + checksum (20), nothing else.
    assert_eq!(data.len(), 32);
    assert!(Index::parse(&data).unwrap().is_empty());
}

#[test]
fn entry_sizes_are_multiples_of_eight() {
    // Path lengths around the 8-byte padding boundary.
    for len in 1..=16 {
        let mut index = Index::new();
        index.add(entry(&"p".repeat(len), 'a'));
        let data = index.serialize();
        let entries_bytes = data.len() - 12 - 20;
        assert_eq!(entries_bytes % 8, 0, "path length {len}");
        Index::parse(&data).unwrap();
    }
}

#[test]
fn assume_valid_and_stage_bits_roundtrip() {
    let mut index = Index::new();
    let mut e = entry("conflicted", 'a');
    e.stage = Stage::Theirs;
    e.flags = EntryFlags { assume_valid: true };
    index.add(e);

    let parsed = Index::parse(&index.serialize()).unwrap();
    let got = parsed
        .get(BStr::new(b"conflicted"), Stage::Theirs)
        .expect("entry at stage 3");
    assert!(got.flags.assume_valid);
}

#[test]
fn flipped_byte_is_checksum_mismatch() {
    let mut data = sample_index().serialize();
    data[30] ^= 0xFF;
    assert!(matches!(
        Index::parse(&data),
        Err(IndexError::ChecksumMismatch)
    ));
}

#[test]
fn bad_magic_rejected() {
    let mut data = sample_index().serialize();
    data[0] = b'X';
    fix_checksum(&mut data);
    assert!(matches!(
        Index::parse(&data),
        Err(IndexError::InvalidHeader(_))
    ));
}

#[test]
fn other_versions_rejected() {
    let mut data = sample_index().serialize();
    data[7] = 3;
    fix_checksum(&mut data);
    assert!(matches!(
        Index::parse(&data),
        Err(IndexError::UnsupportedVersion(3))
    ));
}

#[test]
fn entry_count_mismatch_rejected() {
    let mut data = sample_index().serialize();
    data[11] = 200; // claim more entries than present
    fix_checksum(&mut data);
    assert!(Index::parse(&data).is_err());
}

#[test]
fn mandatory_extension_rejected() {
    let mut data = sample_index().serialize();
    let content_len = data.len() - 20;
    data.truncate(content_len);
    // Uppercase first tag byte marks the extension as mandatory.
    data.extend_from_slice(b"TREE");
    data.extend_from_slice(&4u32.to_be_bytes());
    data.extend_from_slice(b"\0\0\0\0");
    let checksum = Hasher::digest(&data);
    data.extend_from_slice(checksum.as_bytes());

    match Index::parse(&data) {
        Err(IndexError::UnknownExtension { signature }) => assert_eq!(signature, "TREE"),
        other => panic!("expected UnknownExtension, got {other:?}"),
    }
}

#[test]
fn optional_extension_skipped() {
    let mut data = sample_index().serialize();
    let content_len = data.len() - 20;
    data.truncate(content_len);
    // Lowercase first tag byte: skip silently.
    data.extend_from_slice(b"junk");
    data.extend_from_slice(&6u32.to_be_bytes());
    data.extend_from_slice(b"abcdef");
    let checksum = Hasher::digest(&data);
    data.extend_from_slice(checksum.as_bytes());

    let parsed = Index::parse(&data).unwrap();
    assert_eq!(parsed.len(), 3);
}

#[test]
fn truncated_extension_rejected() {
    let mut data = sample_index().serialize();
    let content_len = data.len() - 20;
    data.truncate(content_len);
    data.extend_from_slice(b"junk");
    data.extend_from_slice(&100u32.to_be_bytes()); // claims more than remains
    data.extend_from_slice(b"abc");
    let checksum = Hasher::digest(&data);
    data.extend_from_slice(checksum.as_bytes());

    assert!(matches!(
        Index::parse(&data),
        Err(IndexError::TruncatedExtension { .. })
    ));
}
