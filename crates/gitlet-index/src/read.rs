//! Index file reading (version 2).

use bstr::{BString, ByteSlice};
use gitlet_hash::{Hasher, ObjectId};
use gitlet_object::FileMode;
use gitlet_utils::path::is_valid_entry_path;

use crate::entry::{EntryFlags, IndexEntry, StatData};
use crate::{Index, IndexError, Stage};

/// Magic bytes at the start of every index file.
const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";

/// The only index version this reader accepts.
const INDEX_VERSION: u32 = 2;

/// Parse an index file from raw bytes.
pub fn parse_index(data: &[u8]) -> Result<Index, IndexError> {
    if data.len() < 12 + 20 {
        return Err(IndexError::InvalidHeader("index file too short".into()));
    }

    // Checksum covers everything before the trailing 20 bytes.
    verify_checksum(data)?;

    let mut cursor = 0;

    let sig = &data[cursor..cursor + 4];
    if sig != INDEX_SIGNATURE {
        return Err(IndexError::InvalidHeader(format!(
            "bad signature: expected DIRC, got {sig:?}"
        )));
    }
    cursor += 4;

    let version = read_u32(&data[cursor..]);
    cursor += 4;
    if version != INDEX_VERSION {
        return Err(IndexError::UnsupportedVersion(version));
    }

    let entry_count = read_u32(&data[cursor..]) as usize;
    cursor += 4;

    let content_end = data.len() - 20; // exclude checksum
    let mut entries = Vec::with_capacity(entry_count.min(1 << 16));

    for _ in 0..entry_count {
        let (entry, new_cursor) = parse_entry(data, cursor, content_end)?;
        entries.push(entry);
        cursor = new_cursor;
    }

    skip_extensions(data, cursor, content_end)?;

    Ok(Index { entries })
}

/// Walk the extension blocks after the entries.
///
/// An extension whose tag starts with an uppercase ASCII letter is
/// mandatory and rejected; anything else is skipped silently.
fn skip_extensions(data: &[u8], mut cursor: usize, content_end: usize) -> Result<(), IndexError> {
    while cursor + 8 <= content_end {
        let sig = &data[cursor..cursor + 4];
        let ext_size = read_u32(&data[cursor + 4..]) as usize;
        let signature = String::from_utf8_lossy(sig).into_owned();
        cursor += 8;

        if cursor + ext_size > content_end {
            return Err(IndexError::TruncatedExtension { signature });
        }

        if sig[0].is_ascii_uppercase() {
            return Err(IndexError::UnknownExtension { signature });
        }

        cursor += ext_size;
    }

    if cursor != content_end {
        return Err(IndexError::InvalidHeader(
            "trailing garbage after last extension".into(),
        ));
    }

    Ok(())
}

/// Fixed-size prefix of an on-disk entry:
/// ctime(8) + mtime(8) + dev(4) + ino(4) + mode(4) + uid(4) + gid(4) + size(4) = 40,
/// then hash(20) + flags(2).
const ENTRY_FIXED_SIZE: usize = 40 + 20 + 2;

/// Total on-disk entry size: the fixed part plus the NUL-terminated path,
/// padded with NULs to the next multiple of 8.
fn ondisk_entry_size(name_len: usize) -> usize {
    (ENTRY_FIXED_SIZE + name_len + 8) & !7
}

/// Parse a single entry starting at `start`.
fn parse_entry(
    data: &[u8],
    start: usize,
    content_end: usize,
) -> Result<(IndexEntry, usize), IndexError> {
    let mut cursor = start;

    if cursor + ENTRY_FIXED_SIZE > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "entry too short".into(),
        });
    }

    let stat = StatData {
        ctime_secs: read_u32(&data[cursor..]),
        ctime_nsecs: read_u32(&data[cursor + 4..]),
        mtime_secs: read_u32(&data[cursor + 8..]),
        mtime_nsecs: read_u32(&data[cursor + 12..]),
        dev: read_u32(&data[cursor + 16..]),
        ino: read_u32(&data[cursor + 20..]),
        uid: read_u32(&data[cursor + 28..]),
        gid: read_u32(&data[cursor + 32..]),
        size: read_u32(&data[cursor + 36..]),
    };
    let mode_raw = read_u32(&data[cursor + 24..]);
    cursor += 40;

    let oid =
        ObjectId::from_bytes(&data[cursor..cursor + 20]).map_err(|_| IndexError::InvalidEntry {
            offset: start,
            reason: "invalid OID".into(),
        })?;
    cursor += 20;

    let flags_raw = read_u16(&data[cursor..]);

    let assume_valid = (flags_raw & 0x8000) != 0;
    let extended = (flags_raw & 0x4000) != 0;
    let stage_bits = ((flags_raw >> 12) & 0x03) as u8;
    let name_len_field = (flags_raw & 0x0FFF) as usize;

    if extended {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "extended flag set in a version 2 entry".into(),
        });
    }

    let stage = Stage::from_u8(stage_bits).ok_or_else(|| IndexError::InvalidEntry {
        offset: start,
        reason: format!("invalid stage: {stage_bits}"),
    })?;

    // Path is NUL-terminated; the flags field's length is capped at 0xFFF
    // so the NUL scan is authoritative for long paths.
    let path_start = start + ENTRY_FIXED_SIZE;
    let nul_pos = data[path_start..content_end]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| IndexError::InvalidEntry {
            offset: start,
            reason: "missing NUL in path".into(),
        })?;
    let path = BString::from(&data[path_start..path_start + nul_pos]);

    // Entry paths are work-tree-relative: no leading '/', no '.' or '..'.
    if !is_valid_entry_path(path.as_bstr()) {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: format!("invalid entry path: {path}"),
        });
    }

    if name_len_field < 0xFFF && name_len_field != nul_pos {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: format!(
                "path length field {name_len_field} disagrees with path of {nul_pos} bytes"
            ),
        });
    }

    let entry_size = ondisk_entry_size(nul_pos);
    let entry_end = start + entry_size;
    if entry_end > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "entry padding runs past the end of the file".into(),
        });
    }

    let entry = IndexEntry {
        path,
        oid,
        mode: FileMode::from_raw(mode_raw),
        stage,
        stat,
        flags: EntryFlags { assume_valid },
    };

    Ok((entry, entry_end))
}

/// Verify the trailing SHA-1 over all preceding bytes.
fn verify_checksum(data: &[u8]) -> Result<(), IndexError> {
    let content = &data[..data.len() - 20];
    let stored = &data[data.len() - 20..];
    let computed = Hasher::digest(content);
    if computed.as_bytes() != stored {
        return Err(IndexError::ChecksumMismatch);
    }
    Ok(())
}

fn read_u32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

fn read_u16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}
