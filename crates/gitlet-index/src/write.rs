//! Index file writing (version 2).

use std::io::Write;
use std::path::Path;

use gitlet_hash::Hasher;
use gitlet_utils::AtomicFile;

use crate::entry::IndexEntry;
use crate::{cmp_entries, Index, IndexError};

/// Magic bytes at the start of every index file.
const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";

/// Write the index to a file atomically via its lock file.
pub fn write_index(index: &Index, path: &Path) -> Result<(), IndexError> {
    let mut update = AtomicFile::begin(path).map_err(|_| IndexError::LockFailed {
        path: path.to_path_buf(),
    })?;

    let data = serialize_index(index);
    update.write_all(&data)?;
    update.install().map_err(|_| IndexError::LockFailed {
        path: path.to_path_buf(),
    })?;

    Ok(())
}

/// Serialize the index to bytes: header, sorted entries, trailing SHA-1.
/// No extensions are ever written.
pub fn serialize_index(index: &Index) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(INDEX_SIGNATURE);
    buf.extend_from_slice(&2u32.to_be_bytes());
    buf.extend_from_slice(&(index.len() as u32).to_be_bytes());

    let mut sorted: Vec<&IndexEntry> = index.iter().collect();
    sorted.sort_by(|a, b| cmp_entries(a, b));
    for entry in sorted {
        write_entry(&mut buf, entry);
    }

    let checksum = Hasher::digest(&buf);
    buf.extend_from_slice(checksum.as_bytes());

    buf
}

/// Write a single version 2 entry.
fn write_entry(buf: &mut Vec<u8>, entry: &IndexEntry) {
    let entry_start = buf.len();

    buf.extend_from_slice(&entry.stat.ctime_secs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.ctime_nsecs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.mtime_secs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.mtime_nsecs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.dev.to_be_bytes());
    buf.extend_from_slice(&entry.stat.ino.to_be_bytes());
    buf.extend_from_slice(&entry.mode.raw().to_be_bytes());
    buf.extend_from_slice(&entry.stat.uid.to_be_bytes());
    buf.extend_from_slice(&entry.stat.gid.to_be_bytes());
    buf.extend_from_slice(&entry.stat.size.to_be_bytes());

    buf.extend_from_slice(entry.oid.as_bytes());

    // 16-bit flags: assume-valid, extended (always 0 in v2), stage,
    // path length capped at 0xFFF.
    let name_len = std::cmp::min(entry.path.len(), 0xFFF) as u16;
    let mut flags: u16 = name_len;
    flags |= (entry.stage.as_u8() as u16) << 12;
    if entry.flags.assume_valid {
        flags |= 0x8000;
    }
    buf.extend_from_slice(&flags.to_be_bytes());

    buf.extend_from_slice(&entry.path);

    // NUL-terminate and pad so the whole entry is a multiple of 8 bytes.
    let entry_size = (40 + 20 + 2 + entry.path.len() + 8) & !7;
    let padding = entry_size - (buf.len() - entry_start);
    buf.extend(std::iter::repeat(0u8).take(padding));
}
