//! Recursive tag-prefixed encoder.

use crate::leb;
use crate::tag;
use hlx_value::{ChainRef, Value};

/// Encodes `value` in author (insertion) order — the form used for wire
/// transfer and storage payloads. Digest computation uses
/// [`crate::digest::canonical_encode`] instead, which re-sorts `Object`
/// keys lexicographically.
pub fn encode_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, value, false);
    buf
}

pub(crate) fn write_value(buf: &mut Vec<u8>, value: &Value, canonical: bool) {
    match value {
        Value::Null => buf.push(tag::NULL),
        Value::Bool(b) => {
            buf.push(tag::BOOL);
            buf.push(if *b { 1 } else { 0 });
        }
        Value::Int(i) => {
            buf.push(tag::INT);
            leb::write_i64(buf, *i);
        }
        Value::Float(f) => {
            buf.push(tag::FLOAT);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::Text(s) => {
            buf.push(tag::TEXT);
            write_bytes(buf, s.as_bytes());
        }
        Value::Bytes(b) => {
            buf.push(tag::BYTES);
            write_bytes(buf, b);
        }
        Value::Handle(h) => {
            buf.push(tag::HANDLE);
            write_bytes(buf, h.tag().as_bytes());
            buf.extend_from_slice(h.digest().as_bytes());
        }
        Value::Array(items) => {
            buf.push(tag::ARRAY);
            leb::write_u32(buf, items.len() as u32);
            for item in items {
                write_value(buf, item, canonical);
            }
        }
        Value::Object(obj) => {
            buf.push(tag::OBJECT);
            leb::write_u32(buf, obj.len() as u32);
            let entries: Vec<&(String, Value)> =
                if canonical { obj.sorted_entries() } else { obj.iter().collect() };
            for (key, val) in entries {
                write_bytes(buf, key.as_bytes());
                write_value(buf, val, canonical);
            }
        }
        Value::Contract(c) => {
            buf.push(tag::CONTRACT);
            leb::write_u32(buf, c.contract_id());
            leb::write_u32(buf, c.len() as u32);
            for (idx, val) in c.fields() {
                leb::write_u32(buf, *idx);
                write_value(buf, val, canonical);
            }
        }
        Value::ChainRef(ChainRef::Previous) => buf.push(tag::CHAIN_PREV),
        Value::ChainRef(ChainRef::From(idx)) => {
            buf.push(tag::CHAIN_FROM);
            leb::write_u32(buf, *idx);
        }
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    leb::write_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}
