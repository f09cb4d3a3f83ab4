//! LC-T: the ASCII text projection of the HLX value model. Bijective with
//! LC-B over the value subset LC-T can represent; follows the parser in
//! `lc_t_codec.py`.

mod decode;
mod encode;
mod error;

pub use decode::decode_value;
pub use encode::encode_value;
pub use error::CodecError;
