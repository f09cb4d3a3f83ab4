//! Content-addressed object store: a filesystem object layer keyed by
//! BLAKE2b-256 digest, plus a queryable SQLite metadata index.
//! `HlxStore` is the public entry point; `object` and `index` are the
//! two layers it composes.

mod error;
mod index;
mod metadata;
mod object;
mod store;

pub use error::StoreError;
pub use metadata::{ObjectRecord, PutMetadata, StoreQuery};
pub use store::{HlxStore, StorePutOptions};
