//! LC-B: the canonical tag-prefixed binary encoding of the HLX value
//! model.
//!
//! LC-B is the wire format every other surface in this workspace builds
//! on: content digests (`digest`) are BLAKE2b-256 over a canonicalized
//! LC-B encoding, the batch protocol frames instruction parameters and
//! results as LC-B, and the CAS stores raw LC-B bytes on disk.

mod decode;
mod digest;
mod encode;
mod error;
mod leb;
pub mod tag;
mod tensor;

pub use decode::decode_value;
pub use digest::{canonical_encode, digest, digest_bytes, handle};
pub use encode::encode_value;
pub use error::CodecError;
pub use tensor::{pack_tensor, unpack_tensor};
