use thiserror::Error;

/// LC-R encode/decode failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("LC-R encode error: {0}")]
    LcEncode(String),
    #[error("LC-R decode error: {0}")]
    LcDecode(String),
}

impl From<hlx_value::ValueError> for CodecError {
    fn from(e: hlx_value::ValueError) -> Self {
        CodecError::LcDecode(e.to_string())
    }
}
