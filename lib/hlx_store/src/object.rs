//! Filesystem object layer: two-level hex fan-out, atomic write via
//! temp-file-then-rename.

use crate::error::StoreError;
use hlx_value::Digest;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub struct ObjectLayer {
    objects_root: PathBuf,
}

impl ObjectLayer {
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        ObjectLayer { objects_root: store_root.into().join("objects") }
    }

    pub fn path_for(&self, digest: &Digest) -> PathBuf {
        let hex = digest.to_hex();
        self.objects_root.join(&hex[..2]).join(&hex[2..])
    }

    pub async fn exists(&self, digest: &Digest) -> bool {
        tokio::fs::metadata(self.path_for(digest)).await.is_ok()
    }

    pub async fn read(&self, digest: &Digest) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(self.path_for(digest))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => StoreError::NotFound(digest.to_hex()),
                _ => StoreError::Io(e),
            })
    }

    /// Writes `bytes` to the object path for `digest` if it does not
    /// already exist. Returns `Ok(true)` if this call created the file,
    /// `Ok(false)` if an identical object was already there, and
    /// `Err(DigestCollision)` if the existing bytes differ (should never
    /// happen for a correctly computed digest, but guards against a
    /// corrupted store).
    pub async fn write_if_absent(&self, digest: &Digest, bytes: &[u8]) -> Result<bool, StoreError> {
        let final_path = self.path_for(digest);
        if let Ok(existing) = tokio::fs::read(&final_path).await {
            if existing == bytes {
                return Ok(false);
            }
            return Err(StoreError::DigestCollision { path: final_path.display().to_string() });
        }

        let dir = final_path.parent().expect("object path always has a fan-out parent");
        tokio::fs::create_dir_all(dir).await?;

        let tmp_path = dir.join(format!(".tmp-{}", digest.to_hex()));
        write_atomic(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &final_path).await?;
        Ok(true)
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}
