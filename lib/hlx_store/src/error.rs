use thiserror::Error;

/// CAS failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("digest collision at {path}: stored bytes differ from the bytes being put")]
    DigestCollision { path: String },
    #[error("storage precondition failed: {0}")]
    StoragePrecondition(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("index error: {0}")]
    Index(#[from] sqlx::Error),
    #[error("invalid handle: {0}")]
    InvalidHandle(#[from] hlx_value::ValueError),
}
