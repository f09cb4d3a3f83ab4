//! The HLX abstract value model.
//!
//! `Value` is the single in-memory representation every codec (LC-B,
//! LC-T, LC-R) targets and the dispatch protocol carries. This crate has
//! no codec logic of its own — digest computation and wire encoding live
//! in `hlx_codec_b`, which depends on this crate, not the other way
//! around.

mod contract;
mod error;
mod handle;
mod object;
mod value;

pub use contract::Contract;
pub use error::ValueError;
pub use handle::{Digest, Handle, TAG_GENERIC, TAG_SHADER};
pub use object::Object;
pub use value::{ChainRef, Value, ValueKind};
