//! LC-R encoder, grounded in `lc_r_codec.py`'s `LCREncoder`.

use crate::error::CodecError;
use crate::glyphs as g;
use hlx_value::Value;

pub fn encode_value(value: &Value) -> Result<String, CodecError> {
    match value {
        Value::Null => Ok(g::NULL.to_string()),
        Value::Bool(true) => Ok(g::TRUE.to_string()),
        Value::Bool(false) => Ok(g::FALSE.to_string()),
        Value::Int(i) => Ok(format!("{}{i}", g::INT)),
        Value::Float(f) => encode_float(*f),
        Value::Text(s) => Ok(format!("{}{}", g::TEXT, quote(s))),
        Value::Bytes(b) => Ok(format!("{}{}", g::BYTES, hex::encode(b))),
        Value::Handle(h) => Ok(format!("{}{}", g::HANDLE, h.digest().to_hex())),
        Value::Array(items) => encode_array(items),
        Value::Object(obj) => encode_object(obj),
        Value::Contract(c) => encode_contract(c),
        Value::ChainRef(_) => Err(CodecError::LcEncode(
            "chain references are a batch-protocol internal, not an LC-R surface value".into(),
        )),
    }
}

fn encode_float(f: f64) -> Result<String, CodecError> {
    if f.is_nan() || f.is_infinite() {
        return Err(CodecError::LcEncode("LC-R cannot represent NaN or Infinity".into()));
    }
    let mut s = format!("{f}");
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        s.push_str(".0");
    }
    Ok(format!("{}{s}", g::FLOAT))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn encode_array(items: &[Value]) -> Result<String, CodecError> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        parts.push(encode_value(item)?);
    }
    Ok(format!("{}[{}]", g::ARRAY, parts.join(&g::SEPARATOR.to_string())))
}

fn encode_object(obj: &hlx_value::Object) -> Result<String, CodecError> {
    let mut parts = Vec::with_capacity(obj.len());
    for (key, value) in obj.iter() {
        parts.push(format!("{}{}{}{}", g::TEXT, quote(key), g::BIND, encode_value(value)?));
    }
    Ok(format!("{}{{{}}}", g::OBJECT, parts.join(&g::SEPARATOR.to_string())))
}

fn encode_contract(contract: &hlx_value::Contract) -> Result<String, CodecError> {
    let mut out = format!("{}{}", g::CONTRACT_START, contract.contract_id());
    for (idx, value) in contract.fields() {
        out.push_str(&format!("{}{} {}", g::FIELD, idx, encode_value(value)?));
    }
    out.push(g::CONTRACT_END);
    Ok(out)
}
