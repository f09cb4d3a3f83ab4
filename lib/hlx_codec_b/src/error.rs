use thiserror::Error;

/// LC-B encode/decode failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("LC-B encode error: {0}")]
    LcEncode(String),
    #[error("LC-B decode error: {0}")]
    LcDecode(String),
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::LcDecode(e.to_string())
    }
}

impl From<hlx_value::ValueError> for CodecError {
    fn from(e: hlx_value::ValueError) -> Self {
        CodecError::LcDecode(e.to_string())
    }
}
