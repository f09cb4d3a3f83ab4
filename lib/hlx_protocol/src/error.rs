use hlx_value::ValueKind;
use thiserror::Error;

/// Errors raised while parsing or dispatching a batch: frame parsing,
/// dispatch-time failures, and transport/scheduling errors.
/// CAS errors (`NotFound`, `DigestCollision`, `StoragePrecondition`) live
/// in `hlx_store`; codec errors a handler surfaces are folded into
/// `LcParse` here. The one CAS failure with its own variant here is
/// `HandleUnresolved`, since [`crate::resolve::resolve`] turns a CAS
/// `NotFound` on a handle-resolve path into a dispatch-level error
/// rather than an opaque wrapped one.
#[derive(Debug, Error)]
pub enum HlxError {
    #[error("LC-B parse error: {0}")]
    LcParse(String),
    #[error("batch magic mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    MagicMismatch { expected: u32, actual: u32 },
    #[error("unsupported batch version: {0}")]
    VersionUnsupported(u8),
    #[error("batch trailer digest mismatch")]
    TrailerMismatch,
    #[error("unknown contract id: {0}")]
    ContractUnknown(u32),
    #[error("missing parameter {name:?} for contract {contract_id}")]
    ParamMissing { contract_id: u32, name: String },
    #[error("parameter {name:?} for contract {contract_id}: expected {expected:?}, got {actual:?}")]
    ParamTypeMismatch { contract_id: u32, name: String, expected: ValueKind, actual: ValueKind },
    #[error("chain reference at instruction {index} refers to instruction {target}, which has not run yet")]
    ChainForwardRef { index: usize, target: usize },
    #[error("chain reference at instruction {index} is out of range")]
    ChainOutOfRange { index: usize },
    #[error("handler for contract {contract_id} failed: {message}")]
    HandlerFailed { contract_id: u32, message: String },
    #[error("transport closed mid-read")]
    TransportClosed,
    #[error("batch deadline exceeded")]
    DeadlineExceeded,
    #[error("handle {0} has no object in the store")]
    HandleUnresolved(String),
}

impl From<hlx_codec_b::CodecError> for HlxError {
    fn from(e: hlx_codec_b::CodecError) -> Self {
        HlxError::LcParse(e.to_string())
    }
}

impl From<std::io::Error> for HlxError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => HlxError::TransportClosed,
            _ => HlxError::LcParse(e.to_string()),
        }
    }
}
