//! Handle resolution against the CAS: the dispatch-level counterpart of
//! the `⊖` (resolve-from-CAS) operation named in the value model's
//! glossary. No in-scope contract embeds a `Value::Handle` parameter
//! today, but a future one that does must not let a dangling handle
//! surface as an opaque `HandlerFailed` — it gets its own error kind.

use crate::error::HlxError;
use hlx_codec_b::decode_value;
use hlx_store::{HlxStore, StoreError};
use hlx_value::{Handle, Value};

/// Fetches the object a [`Handle`] points at and decodes it as an LC-B
/// `Value`. A `StoreError::NotFound` becomes `HlxError::HandleUnresolved`;
/// every other store or decode failure propagates as-is.
pub async fn resolve(store: &HlxStore, handle: &Handle) -> Result<Value, HlxError> {
    let bytes = store.get(handle).await.map_err(|e| match e {
        StoreError::NotFound(_) => HlxError::HandleUnresolved(handle.to_string()),
        other => HlxError::LcParse(other.to_string()),
    })?;
    let (value, _consumed) = decode_value(&bytes)?;
    Ok(value)
}
