//! `HlxStore`: the public entry point tying the object layer (§4.6
//! "Object layer") and the metadata index (§4.6 "Index layer") together
//! behind the `put`/`get`/`exists`/`query`/`list`/`stats` contract.
//!
//! Grounded in `shaderdb.py::ShaderDatabase` (same two-layer shape, same
//! method names) with one addition the Python original has no need of:
//! a per-digest write lock so concurrent `put`s of equal bytes converge
//! on a single stored object and a single index row.

use crate::error::StoreError;
use crate::index::MetadataIndex;
use crate::metadata::{ObjectRecord, PutMetadata, StoreQuery};
use crate::object::ObjectLayer;
use chrono::Utc;
use dashmap::DashMap;
use hlx_codec_b::digest_bytes;
use hlx_value::{Digest, Handle, TAG_GENERIC, TAG_SHADER};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Options accepted by [`HlxStore::put`]. Structural SPIR-V preconditions
/// are opt-in via `validate_spirv`.
#[derive(Debug, Clone, Default)]
pub struct StorePutOptions {
    pub metadata: PutMetadata,
    pub validate_spirv: bool,
    /// Tag prefix embedded in the returned handle; `TAG_SHADER` for
    /// shader puts, `TAG_GENERIC` otherwise.
    pub tag: Option<&'static str>,
}

pub struct HlxStore {
    root: PathBuf,
    objects: ObjectLayer,
    index: MetadataIndex,
    locks: DashMap<Digest, Arc<Mutex<()>>>,
}

impl HlxStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        let objects = ObjectLayer::new(root.clone());
        let index = MetadataIndex::connect(&root.join("index.sqlite")).await?;
        Ok(HlxStore { root, objects, index, locks: DashMap::new() })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock_for(&self, digest: &Digest) -> Arc<Mutex<()>> {
        self.locks.entry(*digest).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    fn validate_spirv(bytes: &[u8]) -> Result<(), StoreError> {
        if bytes.len() < 20 {
            return Err(StoreError::StoragePrecondition("SPIR-V payload too small (< 20 bytes)".into()));
        }
        if bytes.len() % 4 != 0 {
            return Err(StoreError::StoragePrecondition("SPIR-V payload must be 4-byte aligned".into()));
        }
        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        if magic != SPIRV_MAGIC {
            return Err(StoreError::StoragePrecondition(format!(
                "invalid SPIR-V magic: 0x{magic:08x}"
            )));
        }
        Ok(())
    }

    /// Stores `bytes`, upserting its metadata row, and returns the
    /// resulting handle. Idempotent on equal bytes;
    /// fails `DigestCollision` if the digest's object path already holds
    /// different bytes (should never happen for a correctly computed
    /// digest — guards against a corrupted store).
    pub async fn put(&self, bytes: &[u8], options: StorePutOptions) -> Result<Handle, StoreError> {
        if options.validate_spirv {
            Self::validate_spirv(bytes)?;
        }

        let digest = digest_bytes(bytes);
        let lock = self.lock_for(&digest);
        let _guard = lock.lock().await;

        self.objects.write_if_absent(&digest, bytes).await?;

        let tag = options.tag.unwrap_or(if options.validate_spirv { TAG_SHADER } else { TAG_GENERIC });
        let handle = Handle::new(tag, digest);
        let created_at = Utc::now().to_rfc3339();
        self.index.upsert(&handle.to_string(), bytes.len() as i64, &created_at, &options.metadata).await?;

        Ok(handle)
    }

    pub async fn get(&self, handle: &Handle) -> Result<Vec<u8>, StoreError> {
        self.objects.read(&handle.digest()).await
    }

    pub async fn exists(&self, handle: &Handle) -> bool {
        self.objects.exists(&handle.digest()).await
    }

    pub async fn query(&self, filter: &StoreQuery) -> Result<Vec<ObjectRecord>, StoreError> {
        self.index.query(filter).await
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<String>, StoreError> {
        self.index.list(limit).await
    }

    pub async fn stats(&self) -> Result<(i64, i64), StoreError> {
        self.index.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc as StdArc;

    fn spirv_blob() -> Vec<u8> {
        // magic (0x07230203 little-endian) + version + generator + bound + schema:
        // the minimal 20-byte SPIR-V header.
        vec![0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]
    }

    #[tokio::test]
    async fn put_is_idempotent_on_equal_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = HlxStore::open(dir.path()).await.unwrap();
        let bytes = spirv_blob();

        let options = || StorePutOptions {
            metadata: PutMetadata { name: Some("t".into()), ..Default::default() },
            validate_spirv: true,
            tag: None,
        };

        let h1 = store.put(&bytes, options()).await.unwrap();
        let h2 = store.put(&bytes, options()).await.unwrap();
        assert_eq!(h1, h2);

        let fetched = store.get(&h1).await.unwrap();
        assert_eq!(fetched, bytes);

        let rows = store.query(&StoreQuery { name: Some("t".into()), ..Default::default() }).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_spirv_magic() {
        let dir = tempfile::tempdir().unwrap();
        let store = HlxStore::open(dir.path()).await.unwrap();
        let mut bytes = spirv_blob();
        bytes[0] = 0xFF;
        let result = store.put(&bytes, StorePutOptions { validate_spirv: true, ..Default::default() }).await;
        assert!(matches!(result, Err(StoreError::StoragePrecondition(_))));
    }

    #[tokio::test]
    async fn generic_put_skips_spirv_validation() {
        let dir = tempfile::tempdir().unwrap();
        let store = HlxStore::open(dir.path()).await.unwrap();
        let handle = store.put(b"not spir-v at all", StorePutOptions::default()).await.unwrap();
        assert_eq!(handle.tag(), TAG_GENERIC);
        assert_eq!(store.get(&handle).await.unwrap(), b"not spir-v at all");
    }

    #[tokio::test]
    async fn get_missing_handle_fails_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = HlxStore::open(dir.path()).await.unwrap();
        let handle = Handle::new(TAG_GENERIC, digest_bytes(b"never stored"));
        assert!(matches!(store.get(&handle).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn digest_collision_detected_on_corrupted_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = HlxStore::open(dir.path()).await.unwrap();
        let bytes = b"original bytes";
        let handle = store.put(bytes, StorePutOptions::default()).await.unwrap();

        let path = store.objects.path_for(&handle.digest());
        tokio::fs::write(&path, b"corrupted!!!!!").await.unwrap();

        let result = store.put(bytes, StorePutOptions::default()).await;
        assert!(matches!(result, Err(StoreError::DigestCollision { .. })));
    }

    #[tokio::test]
    async fn concurrent_equal_puts_converge_on_one_handle() {
        let dir = tempfile::tempdir().unwrap();
        let store = StdArc::new(HlxStore::open(dir.path()).await.unwrap());
        let bytes: StdArc<Vec<u8>> = StdArc::new(b"shared payload".to_vec());

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let bytes = bytes.clone();
            tasks.push(tokio::spawn(async move {
                store.put(&bytes, StorePutOptions::default()).await.unwrap()
            }));
        }

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap().to_string());
        }
        assert!(handles.windows(2).all(|w| w[0] == w[1]));

        let rows = store.list(10).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
