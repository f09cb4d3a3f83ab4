//! LC-T encoder, grounded in `lc_t_codec.py`'s `LCTEncoder`.

use crate::error::CodecError;
use hlx_value::Value;

/// Encodes `value` to its LC-T text form.
///
/// Fails on `Float(NaN)`/`Float(±Infinity)`: the grammar's `float`
/// production has no token for either, so there is no
/// text this could round-trip to.
pub fn encode_value(value: &Value) -> Result<String, CodecError> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(true) => Ok("TRUE".to_string()),
        Value::Bool(false) => Ok("FALSE".to_string()),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => encode_float(*f),
        Value::Text(s) => Ok(encode_string(s)),
        Value::Bytes(b) => Ok(format!("#{}", hex::encode(b))),
        Value::Handle(h) => Ok(format!("@{}", h.digest().to_hex())),
        Value::Array(items) => encode_array(items),
        Value::Object(obj) => encode_object(obj),
        Value::Contract(c) => encode_contract(c),
        Value::ChainRef(_) => Err(CodecError::LcEncode(
            "chain references are a batch-protocol internal, not an LC-T surface value".into(),
        )),
    }
}

fn encode_float(f: f64) -> Result<String, CodecError> {
    if f.is_nan() || f.is_infinite() {
        return Err(CodecError::LcEncode("LC-T cannot represent NaN or Infinity".into()));
    }
    let mut s = format!("{f}");
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        s.push_str(".0");
    }
    Ok(s)
}

fn encode_string(s: &str) -> String {
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
    Ok(format!("[{}]", parts.join(",")))
}

fn encode_object(obj: &hlx_value::Object) -> Result<String, CodecError> {
    let mut parts = Vec::with_capacity(obj.len());
    for (key, value) in obj.iter() {
        parts.push(format!("{key}:{}", encode_value(value)?));
    }
    Ok(format!("{{{}}}", parts.join(",")))
}

fn encode_contract(contract: &hlx_value::Contract) -> Result<String, CodecError> {
    let mut parts = vec![format!("C:{}", contract.contract_id())];
    for (idx, value) in contract.fields() {
        parts.push(format!("{idx}={}", encode_value(value)?));
    }
    Ok(format!("{{{}}}", parts.join(",")))
}
