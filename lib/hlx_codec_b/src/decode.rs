//! Total decoder for the LC-B wire format.
//!
//! Every reader here is bounds-checked: truncated input, an overlong
//! LEB128 varint, an unrecognized tag byte, or non-UTF-8 text all produce
//! a `CodecError::LcDecode` rather than a panic.

use crate::error::CodecError;
use crate::leb;
use crate::tag;
use hlx_value::{ChainRef, Contract, Digest, Handle, Object, Value};
use std::io::{Cursor, Read};

/// Decodes one `Value` starting at the beginning of `bytes`, returning it
/// together with the number of bytes consumed. Trailing bytes are left
/// untouched — callers that expect an exact-length buffer should check
/// the returned length themselves.
pub fn decode_value(bytes: &[u8]) -> Result<(Value, usize), CodecError> {
    let mut cursor = Cursor::new(bytes);
    let value = read_value(&mut cursor)?;
    Ok((value, cursor.position() as usize))
}

/// Bytes left unread in `cursor`. Every element of a length-prefixed
/// sequence (array item, object pair, contract field) consumes at least
/// one byte, so capping a `Vec::with_capacity` hint at this bound keeps a
/// hostile, truncated body with an inflated LEB128 count (e.g.
/// `n = u32::MAX`) from reserving multiple gigabytes before the read loop
/// ever hits end-of-input.
fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor.get_ref().len().saturating_sub(cursor.position() as usize)
}

fn read_tag(cursor: &mut Cursor<&[u8]>) -> Result<u8, CodecError> {
    let mut byte = [0u8; 1];
    cursor
        .read_exact(&mut byte)
        .map_err(|_| CodecError::LcDecode("truncated input: expected a tag byte".into()))?;
    Ok(byte[0])
}

fn read_raw(cursor: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>, CodecError> {
    let mut out = vec![0u8; len];
    cursor
        .read_exact(&mut out)
        .map_err(|_| CodecError::LcDecode(format!("truncated input: expected {len} more bytes")))?;
    Ok(out)
}

fn read_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>, CodecError> {
    let len = leb::read_u32(cursor)? as usize;
    read_raw(cursor, len)
}

fn read_text(cursor: &mut Cursor<&[u8]>) -> Result<String, CodecError> {
    let raw = read_bytes(cursor)?;
    String::from_utf8(raw).map_err(|e| CodecError::LcDecode(format!("text is not valid UTF-8: {e}")))
}

fn read_value(cursor: &mut Cursor<&[u8]>) -> Result<Value, CodecError> {
    let t = read_tag(cursor)?;
    match t {
        tag::NULL => Ok(Value::Null),
        tag::BOOL => {
            let byte = read_raw(cursor, 1)?[0];
            match byte {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(CodecError::LcDecode(format!("invalid bool byte {other}"))),
            }
        }
        tag::INT => Ok(Value::Int(leb::read_i64(cursor)?)),
        tag::FLOAT => {
            let raw = read_raw(cursor, 8)?;
            let mut arr = [0u8; 8];
            arr.copy_from_slice(&raw);
            Ok(Value::Float(f64::from_le_bytes(arr)))
        }
        tag::TEXT => Ok(Value::Text(read_text(cursor)?)),
        tag::BYTES => Ok(Value::Bytes(read_bytes(cursor)?)),
        tag::HANDLE => {
            let handle_tag = read_text(cursor)?;
            let raw = read_raw(cursor, 32)?;
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&raw);
            Ok(Value::Handle(Handle::new(handle_tag, Digest(arr))))
        }
        tag::ARRAY => {
            let count = leb::read_u32(cursor)? as usize;
            let mut items = Vec::with_capacity(count.min(remaining(cursor)));
            for _ in 0..count {
                items.push(read_value(cursor)?);
            }
            Ok(Value::Array(items))
        }
        tag::OBJECT => {
            let count = leb::read_u32(cursor)? as usize;
            let mut pairs = Vec::with_capacity(count.min(remaining(cursor)));
            for _ in 0..count {
                let key = read_text(cursor)?;
                let val = read_value(cursor)?;
                pairs.push((key, val));
            }
            Ok(Value::Object(Object::from_pairs(pairs)?))
        }
        tag::CONTRACT => {
            let contract_id = leb::read_u32(cursor)?;
            let count = leb::read_u32(cursor)? as usize;
            let mut fields = Vec::with_capacity(count.min(remaining(cursor)));
            for _ in 0..count {
                let idx = leb::read_u32(cursor)?;
                let val = read_value(cursor)?;
                fields.push((idx, val));
            }
            Ok(Value::Contract(Contract::new(contract_id, fields)?))
        }
        tag::CHAIN_PREV => Ok(Value::ChainRef(ChainRef::Previous)),
        tag::CHAIN_FROM => {
            let idx = leb::read_u32(cursor)?;
            Ok(Value::ChainRef(ChainRef::From(idx)))
        }
        other => Err(CodecError::LcDecode(format!("unrecognized LC-B tag byte {other}"))),
    }
}
