use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::AtomicFileError;
use crate::Result;

/// An exclusive, all-or-nothing rewrite of a single file.
///
/// [`begin`](AtomicFile::begin) claims `<target>.lock` with O_CREAT|O_EXCL.
/// The lock file doubles as the staging area: new contents accumulate there
/// (buffered) until [`install`](AtomicFile::install) publishes them with a
/// single rename. A guard dropped without installing deletes the staged
/// bytes and releases the claim, so readers of `target` only ever observe
/// the old contents or the complete new ones.
pub struct AtomicFile {
    /// Final destination of the staged bytes.
    target: PathBuf,
    /// `<target>.lock`, holding the pending contents.
    staging: PathBuf,
    /// Buffered writer over the staging file; taken once resolved.
    out: Option<BufWriter<File>>,
}

impl AtomicFile {
    /// Start an update of `target` by claiming its lock file.
    ///
    /// Fails with [`AtomicFileError::Busy`] when the lock file already
    /// exists, i.e. another writer is mid-update (or crashed and left its
    /// claim behind).
    pub fn begin(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let staging = staging_path(&target);

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(AtomicFileError::Busy { target }.into());
            }
            Err(source) => {
                return Err(AtomicFileError::Stage { target, source }.into());
            }
        };

        Ok(Self {
            target,
            staging,
            out: Some(BufWriter::new(file)),
        })
    }

    /// The destination path of this update.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The staging (lock file) path.
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Flush, sync, and rename the staged contents over the target.
    pub fn install(mut self) -> Result<()> {
        let Some(writer) = self.out.take() else {
            return Ok(());
        };

        let staged = (|| {
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            fs::rename(&self.staging, &self.target)
        })();

        staged.map_err(|source| {
            let _ = fs::remove_file(&self.staging);
            AtomicFileError::Install {
                target: self.target.clone(),
                source,
            }
            .into()
        })
    }

    /// Throw away the staged bytes and release the claim.
    pub fn discard(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if self.out.take().is_some() {
            let _ = fs::remove_file(&self.staging);
        }
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.out.as_mut() {
            Some(out) => out.write(buf),
            None => Err(io::Error::other("file update already resolved")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.out.as_mut() {
            Some(out) => out.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// `<target>.lock`, preserving non-UTF-8 paths.
fn staging_path(target: &Path) -> PathBuf {
    let mut raw = target.as_os_str().to_os_string();
    raw.push(".lock");
    PathBuf::from(raw)
}
