use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{ExportError, Result};

/// Complete output sitting in a temporary file beside its target.
///
/// Nothing is visible at the target until [`StagedFile::persist`]; dropping
/// the value removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    temp: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temporary file over the target
    pub async fn persist(self) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            let StagedFile { path, temp } = self;
            temp.persist(&path).map_err(|e| ExportError::Write {
                path: path.clone(),
                source: e.error,
            })?;
            log::debug!("Persisted {}", path.display());
            Ok(())
        })
        .await?
    }
}

/// Write `bytes` to a temporary file in the directory of `path`
pub async fn stage(path: impl AsRef<Path>, bytes: Vec<u8>) -> Result<StagedFile> {
    let path = path.as_ref().to_owned();
    tokio::task::spawn_blocking(move || stage_sync(path, &bytes)).await?
}

/// Write `bytes` to `path` so that the target only ever holds complete output.
///
/// The bytes go to a temporary file in the target directory which is renamed
/// over `path` once fully written. On failure the temporary file is removed
/// and an existing target is left untouched.
pub async fn write_atomic(path: impl AsRef<Path>, bytes: Vec<u8>) -> Result<()> {
    stage(path, bytes).await?.persist().await
}

fn stage_sync(path: PathBuf, bytes: &[u8]) -> Result<StagedFile> {
    let write_error = |source: std::io::Error| ExportError::Write {
        path: path.clone(),
        source,
    };

    let dir = target_dir(&path);
    let mut temp = tempfile::Builder::new()
        .prefix(".duplex-")
        .suffix(".part")
        .tempfile_in(&dir)
        .map_err(write_error)?;

    temp.write_all(bytes).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;

    log::debug!("Staged {} bytes for {}", bytes.len(), path.display());
    Ok(StagedFile { path, temp })
}

fn target_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
