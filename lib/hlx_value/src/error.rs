use thiserror::Error;

/// Errors raised while constructing or parsing bare `Value` model types
/// (not codec-level parse errors, which live in `hlx_codec_b`/`_t`/`_r`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("duplicate object key: {0}")]
    DuplicateKey(String),
    #[error("duplicate contract field index: {0}")]
    DuplicateFieldIndex(u32),
    #[error("invalid digest hex: {0}")]
    InvalidDigest(String),
    #[error("invalid handle string: {0}")]
    InvalidHandle(String),
}
