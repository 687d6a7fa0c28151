use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt as _};

use crate::foundation::error::{DrapeError, DrapeResult};
use crate::store::{ArtifactStore, check_name};

/// Writes artifacts into a flat directory and addresses them under `base_url`.
#[derive(Clone, Debug)]
pub struct FsArtifactStore {
    root: PathBuf,
    base_url: String,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Directory artifacts are written into.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        suggested_name: &str,
        content_type: &str,
    ) -> DrapeResult<String> {
        check_name(suggested_name)?;
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            DrapeError::storage(format!("create '{}': {e}", self.root.display()))
        })?;

        let path = self.root.join(suggested_name);
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    DrapeError::storage(format!("artifact '{suggested_name}' already exists"))
                }
                _ => DrapeError::storage(format!("open '{}': {e}", path.display())),
            })?;
        write_or_discard(file, &path, &bytes).await?;

        tracing::debug!(name = suggested_name, content_type, len = bytes.len(), "stored artifact");
        Ok(format!("{}/{suggested_name}", self.base_url))
    }
}

/// Write `bytes` to the freshly created `path`; on failure the partial file is removed, since its
/// name is never handed out.
async fn write_or_discard(
    mut file: impl AsyncWrite + Unpin,
    path: &Path,
    bytes: &[u8],
) -> DrapeResult<()> {
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;
    let Err(e) = written else {
        return Ok(());
    };
    drop(file);
    if let Err(rm) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), err = %rm, "failed to remove partial artifact");
    }
    Err(DrapeError::storage(format!("write '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/store/fs.rs"]
mod tests;
