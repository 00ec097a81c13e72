use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};

use super::DocumentKind;

/// Scoped storage for uploaded bytes while they are being extracted.
///
/// Either a caller-owned directory or a private temporary directory that is
/// removed together with the handle.
#[derive(Debug)]
pub struct ScratchSpace {
    root: PathBuf,
    _owned: Option<TempDir>,
}

impl ScratchSpace {
    /// Use (and create if needed) a caller-chosen directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let root = dir.into();
        std::fs::create_dir_all(&root)?;

        Ok(Self { root, _owned: None })
    }

    /// Private temporary directory, removed when the handle is dropped.
    pub fn temporary() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("docchat-").tempdir()?;

        Ok(Self {
            root: dir.path().to_path_buf(),
            _owned: Some(dir),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to a fresh file under the scratch root.
    pub fn stage(&self, kind: DocumentKind, bytes: &[u8]) -> io::Result<StagedUpload> {
        let suffix = format!(".{}", kind.extension());
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.root)?;
        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!(path = %file.path().display(), bytes = bytes.len(), "Staged upload");
        Ok(StagedUpload { file })
    }
}

/// A staged upload. The file is deleted on drop, whatever the exit path.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete now and report failures instead of swallowing them in drop.
    pub fn release(self) -> io::Result<()> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        tracing::debug!(path = %path.display(), "Released staged upload");
        Ok(())
    }
}
