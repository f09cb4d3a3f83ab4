use thiserror::Error;

/// LC-T encode/decode failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("LC-T encode error: {0}")]
    LcEncode(String),
    #[error("LC-T decode error: {0}")]
    LcDecode(String),
}

impl From<hlx_value::ValueError> for CodecError {
    fn from(e: hlx_value::ValueError) -> Self {
        CodecError::LcDecode(e.to_string())
    }
}
