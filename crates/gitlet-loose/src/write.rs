use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use gitlet_hash::{Hasher, ObjectId};
use gitlet_object::{header, Object, ObjectType};

use crate::{LooseError, LooseObjectStore};

impl LooseObjectStore {
    /// Write an object to the loose store. Returns the OID.
    ///
    /// No-op if the object already exists (content-addressed idempotence).
    /// The file is written atomically (temp file + rename).
    pub fn write(&self, obj: &Object) -> Result<ObjectId, LooseError> {
        let payload = obj.serialize_payload();
        self.write_raw(obj.object_type(), &payload)
    }

    /// Write a raw payload with a known kind. Returns the OID.
    pub fn write_raw(&self, obj_type: ObjectType, payload: &[u8]) -> Result<ObjectId, LooseError> {
        let hdr = header::write_header(obj_type, payload.len());

        // The key is the hash of the uncompressed framed bytes.
        let oid = {
            let mut hasher = Hasher::new();
            hasher.update(&hdr);
            hasher.update(payload);
            hasher.finalize()
        };

        if self.contains(&oid) {
            return Ok(oid);
        }

        let final_path = self.object_path(&oid);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = write_to_temp(self.objects_dir(), &hdr, payload, self.compression_level)?;
        finalize_object(&tmp_path, &final_path)?;

        Ok(oid)
    }
}

/// Compress header + payload into a temp file under `objects_dir`.
fn write_to_temp(
    objects_dir: &Path,
    hdr: &[u8],
    payload: &[u8],
    level: flate2::Compression,
) -> Result<std::path::PathBuf, LooseError> {
    let tmp_path = objects_dir.join(format!(
        "tmp_obj_{}",
        std::process::id()
            ^ std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
    ));

    let file = fs::File::create(&tmp_path)?;
    let mut encoder = ZlibEncoder::new(file, level);
    encoder.write_all(hdr)?;
    encoder.write_all(payload)?;
    encoder.finish()?;

    // Objects are write-once; match C git's read-only permissions.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o444))?;
    }

    Ok(tmp_path)
}

/// Atomically move a temp file to its final destination.
///
/// If the destination already exists (race with another writer), the temp
/// file is removed and the write counts as successful.
fn finalize_object(tmp: &Path, final_path: &Path) -> Result<(), LooseError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(LooseError::Io(e))
        }
    }
}
