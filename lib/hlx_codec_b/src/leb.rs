//! Thin wrappers around the `leb128` crate matching the exact semantics
//! `hlx_lcb_client.py`'s `encode_leb128_u32`/`decode_leb128_u32` and
//! `encode_leb128_i64`/`decode_leb128_i64` implement by hand.

use crate::error::CodecError;
use std::io::Cursor;

pub fn write_u32(buf: &mut Vec<u8>, value: u32) {
    leb128::write::unsigned(buf, value as u64).expect("Vec<u8> writes never fail");
}

pub fn write_i64(buf: &mut Vec<u8>, value: i64) {
    leb128::write::signed(buf, value).expect("Vec<u8> writes never fail");
}

/// Reads an unsigned LEB128 `u32` from `bytes` starting at `cursor`'s
/// position, advancing it. Rejects values that don't fit in 32 bits and
/// overlong/truncated encodings.
pub fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    let value = leb128::read::unsigned(cursor)
        .map_err(|e| CodecError::LcDecode(format!("malformed LEB128 u32: {e}")))?;
    u32::try_from(value).map_err(|_| CodecError::LcDecode(format!("LEB128 value {value} overflows u32")))
}

pub fn read_i64(cursor: &mut Cursor<&[u8]>) -> Result<i64, CodecError> {
    leb128::read::signed(cursor).map_err(|e| CodecError::LcDecode(format!("malformed LEB128 i64: {e}")))
}
