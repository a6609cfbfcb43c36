use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use gitlet_hash::ObjectId;
use gitlet_utils::AtomicFile;

use crate::error::RefError;
use crate::name::RefName;
use crate::Reference;

/// Read a loose ref file and return the Reference.
///
/// A loose ref file holds either `"<40-hex>\n"` or `"ref: <full-name>\n"`.
pub(crate) fn read_loose_ref(
    git_dir: &Path,
    name: &RefName,
) -> Result<Option<Reference>, RefError> {
    let path = loose_ref_path(git_dir, name);
    let contents = match fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(RefError::IoPath {
                path: path.clone(),
                source: e,
            })
        }
    };

    let trimmed = contents.trim();

    if let Some(target_bytes) = trimmed.strip_prefix(b"ref: ") {
        let target_str = std::str::from_utf8(target_bytes.trim())
            .map_err(|_| RefError::Parse("invalid UTF-8 in symbolic ref target".into()))?;
        let target = RefName::new(target_str)?;
        Ok(Some(Reference::Symbolic {
            name: name.clone(),
            target,
        }))
    } else {
        let hex = std::str::from_utf8(trimmed)
            .map_err(|_| RefError::Parse("invalid UTF-8 in ref OID".into()))?;
        let oid = ObjectId::from_hex(hex)?;
        Ok(Some(Reference::Direct {
            name: name.clone(),
            target: oid,
        }))
    }
}

/// Write a direct loose ref atomically (staged lock file + rename).
pub(crate) fn write_loose_ref(
    git_dir: &Path,
    name: &RefName,
    oid: &ObjectId,
) -> Result<(), RefError> {
    write_ref_file(git_dir, name, format!("{}\n", oid.to_hex()).as_bytes())
}

/// Write a symbolic loose ref atomically.
pub(crate) fn write_symbolic_ref(
    git_dir: &Path,
    name: &RefName,
    target: &RefName,
) -> Result<(), RefError> {
    write_ref_file(git_dir, name, format!("ref: {target}\n").as_bytes())
}

fn write_ref_file(git_dir: &Path, name: &RefName, content: &[u8]) -> Result<(), RefError> {
    let path = loose_ref_path(git_dir, name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RefError::IoPath {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut update = AtomicFile::begin(&path)?;
    update.write_all(content).map_err(|e| RefError::IoPath {
        path: path.clone(),
        source: e,
    })?;
    update.install()?;
    Ok(())
}

/// Delete a loose ref file, pruning now-empty parent directories under refs/.
pub(crate) fn delete_loose_ref(git_dir: &Path, name: &RefName) -> Result<(), RefError> {
    let path = loose_ref_path(git_dir, name);
    if !path.exists() {
        return Ok(());
    }
    fs::remove_file(&path).map_err(|e| RefError::IoPath {
        path: path.clone(),
        source: e,
    })?;

    let refs_dir = git_dir.join("refs");
    let mut dir = path.parent().map(|p| p.to_path_buf());
    while let Some(d) = dir {
        if d == refs_dir || d == *git_dir {
            break;
        }
        if d.read_dir().map(|mut e| e.next().is_none()).unwrap_or(false) {
            let _ = fs::remove_dir(&d);
            dir = d.parent().map(|p| p.to_path_buf());
        } else {
            break;
        }
    }
    Ok(())
}

/// Enumerate loose refs under a prefix, sorted by name.
pub(crate) fn enumerate_loose_refs(
    git_dir: &Path,
    prefix: Option<&str>,
) -> Result<Vec<RefName>, RefError> {
    let refs_base = git_dir.join("refs");
    let search_dir = match prefix {
        Some(p) => {
            let sub = p.strip_prefix("refs/").unwrap_or(p);
            if sub.is_empty() {
                refs_base.clone()
            } else {
                refs_base.join(sub)
            }
        }
        None => refs_base.clone(),
    };

    let mut result = Vec::new();
    if search_dir.is_dir() {
        collect_loose_refs(git_dir, &search_dir, prefix, &mut result)?;
    }
    result.sort();
    Ok(result)
}

fn collect_loose_refs(
    git_dir: &Path,
    dir: &Path,
    prefix: Option<&str>,
    result: &mut Vec<RefName>,
) -> Result<(), RefError> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(RefError::IoPath {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    for entry in entries {
        let entry = entry.map_err(|e| RefError::IoPath {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if path.is_dir() {
            collect_loose_refs(git_dir, &path, prefix, result)?;
        } else if path.is_file() {
            let rel = path
                .strip_prefix(git_dir)
                .map_err(|_| RefError::Parse("cannot build ref name from path".into()))?;
            let Some(name_str) = rel.to_str() else {
                continue;
            };
            if name_str.ends_with(".lock") {
                continue;
            }
            // Stored paths use '/' even on Windows.
            let name_str = name_str.replace('\\', "/");
            if let Ok(name) = RefName::new(name_str.as_str()) {
                if let Some(p) = prefix {
                    if !name.as_str().starts_with(p) {
                        continue;
                    }
                }
                result.push(name);
            }
        }
    }

    Ok(())
}

/// The filesystem path for a loose ref.
pub(crate) fn loose_ref_path(git_dir: &Path, name: &RefName) -> PathBuf {
    git_dir.join(name.as_str())
}
