//! LC-B batch wire format: the request ("LC-B batch") and
//! response payloads framed by [`crate::frame`]. Grounded byte-for-byte
//! in `hlx_lcb_client.py`'s `LCBBatchBuilder.build`/`LCBClient._parse_response`.

use crate::error::HlxError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use hlx_codec_b::{decode_value, encode_value};
use hlx_value::{ChainRef, Digest, Value, ValueKind};
use std::io::Cursor;

type Blake2b256 = Blake2b<U32>;

/// LC-B magic: `"LCB1"` read little-endian.
pub const MAGIC: u32 = 0x3142_434C;
/// The only version this crate implements. The trailer algorithm is tied
/// to the version byte; bumping to SHA-256 (or any other digest) would
/// require a new version.
pub const VERSION: u8 = 1;

fn write_u32(buf: &mut Vec<u8>, value: u32) {
    leb128::write::unsigned(buf, value as u64).expect("Vec<u8> writes never fail");
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, HlxError> {
    let value = leb128::read::unsigned(cursor).map_err(|e| HlxError::LcParse(format!("malformed LEB128 u32: {e}")))?;
    u32::try_from(value).map_err(|_| HlxError::LcParse(format!("LEB128 value {value} overflows u32")))
}

fn trailer_digest(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}

/// One `(contract_id, named parameters)` instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub contract_id: u32,
    pub params: Vec<(String, Value)>,
}

impl Instruction {
    pub fn new(contract_id: u32, params: Vec<(String, Value)>) -> Self {
        Instruction { contract_id, params }
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub batch_id: [u8; 32],
    pub instructions: Vec<Instruction>,
}

impl BatchRequest {
    pub fn new(batch_id: [u8; 32], instructions: Vec<Instruction>) -> Self {
        BatchRequest { batch_id, instructions }
    }

    /// Encodes the wire form including the trailing digest.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC.to_le_bytes());
        buf.push(VERSION);
        buf.extend_from_slice(&self.batch_id);
        write_u32(&mut buf, self.instructions.len() as u32);
        for instruction in &self.instructions {
            write_u32(&mut buf, instruction.contract_id);
            write_u32(&mut buf, instruction.params.len() as u32);
            for (name, value) in &instruction.params {
                let name_bytes = name.as_bytes();
                write_u32(&mut buf, name_bytes.len() as u32);
                buf.extend_from_slice(name_bytes);
                buf.extend_from_slice(&encode_value(value));
            }
        }
        let trailer = trailer_digest(&buf);
        buf.extend_from_slice(&trailer);
        buf
    }

    /// Decodes and verifies a full request frame. Rejects, in order:
    /// `MagicMismatch`, `VersionUnsupported`, truncated/malformed bodies
    /// as `LcParse`, and `TrailerMismatch`. Each check is exclusive: a
    /// bad magic never also reports a bad trailer.
    pub fn decode(bytes: &[u8]) -> Result<Self, HlxError> {
        if bytes.len() < 4 + 1 + 32 + 32 {
            return Err(HlxError::LcParse("batch frame shorter than the fixed header + trailer".into()));
        }

        let body_len = bytes.len() - 32;
        let body = &bytes[..body_len];
        let trailer = &bytes[body_len..];

        let mut cursor = Cursor::new(body);
        let mut magic_buf = [0u8; 4];
        read_exact(&mut cursor, &mut magic_buf)?;
        let magic = u32::from_le_bytes(magic_buf);
        if magic != MAGIC {
            return Err(HlxError::MagicMismatch { expected: MAGIC, actual: magic });
        }

        let mut version_buf = [0u8; 1];
        read_exact(&mut cursor, &mut version_buf)?;
        let version = version_buf[0];
        if version != VERSION {
            return Err(HlxError::VersionUnsupported(version));
        }

        let mut batch_id = [0u8; 32];
        read_exact(&mut cursor, &mut batch_id)?;

        let computed_trailer = trailer_digest(body);
        if computed_trailer != trailer {
            return Err(HlxError::TrailerMismatch);
        }

        let n_instructions = read_u32(&mut cursor)?;
        let mut instructions = Vec::with_capacity((n_instructions as usize).min(bytes_left(&cursor)));
        for _ in 0..n_instructions {
            let contract_id = read_u32(&mut cursor)?;
            let n_params = read_u32(&mut cursor)?;
            let mut params = Vec::with_capacity((n_params as usize).min(bytes_left(&cursor)));
            for _ in 0..n_params {
                let name_len = read_u32(&mut cursor)? as usize;
                let mut name_bytes = vec![0u8; name_len];
                read_exact(&mut cursor, &mut name_bytes)?;
                let name = String::from_utf8(name_bytes)
                    .map_err(|e| HlxError::LcParse(format!("param name is not UTF-8: {e}")))?;

                let remaining_start = cursor.position() as usize;
                let remaining = &body[remaining_start..];
                let (value, consumed) = decode_value(remaining)?;
                cursor.set_position((remaining_start + consumed) as u64);

                params.push((name, value));
            }
            instructions.push(Instruction::new(contract_id, params));
        }

        if (cursor.position() as usize) != body.len() {
            return Err(HlxError::LcParse("trailing bytes after last instruction".into()));
        }

        Ok(BatchRequest { batch_id, instructions })
    }
}

fn read_exact(cursor: &mut Cursor<&[u8]>, out: &mut [u8]) -> Result<(), HlxError> {
    use std::io::Read;
    cursor.read_exact(out).map_err(|_| HlxError::LcParse("unexpected end of batch frame".into()))
}

/// Bytes left unread in `cursor`. A length-prefixed count read off the
/// wire is attacker-controlled; capping a `Vec::with_capacity` hint at
/// this bound means a declared count far larger than the actual body
/// (e.g. `u32::MAX` instructions in a few-byte frame) fails cleanly on
/// the first short read instead of reserving gigabytes up front.
fn bytes_left(cursor: &Cursor<&[u8]>) -> usize {
    cursor.get_ref().len().saturating_sub(cursor.position() as usize)
}

/// One result entry in a response.
/// Distinct from [`Value`]: `Tensor`'s elements are `binary32` and
/// `Float` here is `binary32` too, both deliberately narrower than LC-B's
/// `binary64` `Value::Float`.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchResult {
    Null,
    Bool(bool),
    Int(i64),
    Float(f32),
    Tensor { shape: Vec<u32>, data: Vec<f32> },
    Handle(Digest),
    Error(String),
}

impl BatchResult {
    pub fn kind_byte(&self) -> u8 {
        match self {
            BatchResult::Null => 0,
            BatchResult::Bool(_) => 1,
            BatchResult::Int(_) => 2,
            BatchResult::Float(_) => 3,
            BatchResult::Tensor { .. } => 4,
            BatchResult::Handle(_) => 5,
            BatchResult::Error(_) => 6,
        }
    }

    /// The `Value` a [`ChainRef`] resolves to when a later instruction
    /// chains into this result. Chaining
    /// into an `Error` result has no sensible `Value`, so callers must
    /// check for that case themselves before calling this.
    pub fn as_chained_value(&self) -> Option<Value> {
        match self {
            BatchResult::Null => Some(Value::Null),
            BatchResult::Bool(b) => Some(Value::Bool(*b)),
            BatchResult::Int(i) => Some(Value::Int(*i)),
            BatchResult::Float(f) => Some(Value::Float(*f as f64)),
            BatchResult::Tensor { shape, data } => {
                hlx_codec_b::pack_tensor(shape, data).ok().map(Value::Bytes)
            }
            BatchResult::Handle(digest) => {
                Some(Value::Handle(hlx_value::Handle::new(hlx_value::TAG_GENERIC, *digest)))
            }
            BatchResult::Error(_) => None,
        }
    }

    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            BatchResult::Null => Some(ValueKind::Null),
            BatchResult::Bool(_) => Some(ValueKind::Bool),
            BatchResult::Int(_) => Some(ValueKind::Int),
            BatchResult::Float(_) => Some(ValueKind::Float),
            BatchResult::Tensor { .. } => Some(ValueKind::Bytes),
            BatchResult::Handle(_) => Some(ValueKind::Handle),
            BatchResult::Error(_) => None,
        }
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.kind_byte());
        match self {
            BatchResult::Null => {}
            BatchResult::Bool(b) => buf.push(if *b { 1 } else { 0 }),
            BatchResult::Int(i) => leb128::write::signed(buf, *i).expect("Vec<u8> writes never fail"),
            BatchResult::Float(f) => buf.extend_from_slice(&f.to_le_bytes()),
            BatchResult::Tensor { shape, data } => {
                write_u32(buf, shape.len() as u32);
                for dim in shape {
                    write_u32(buf, *dim);
                }
                write_u32(buf, data.len() as u32);
                for element in data {
                    buf.extend_from_slice(&element.to_le_bytes());
                }
            }
            BatchResult::Handle(digest) => buf.extend_from_slice(digest.as_bytes()),
            BatchResult::Error(msg) => {
                let bytes = msg.as_bytes();
                write_u32(buf, bytes.len() as u32);
                buf.extend_from_slice(bytes);
            }
        }
    }

    fn decode(cursor: &mut Cursor<&[u8]>) -> Result<Self, HlxError> {
        let mut kind_buf = [0u8; 1];
        read_exact(cursor, &mut kind_buf)?;
        Ok(match kind_buf[0] {
            0 => BatchResult::Null,
            1 => {
                let mut b = [0u8; 1];
                read_exact(cursor, &mut b)?;
                BatchResult::Bool(b[0] != 0)
            }
            2 => BatchResult::Int(
                leb128::read::signed(cursor).map_err(|e| HlxError::LcParse(format!("malformed result int: {e}")))?,
            ),
            3 => {
                let mut b = [0u8; 4];
                read_exact(cursor, &mut b)?;
                BatchResult::Float(f32::from_le_bytes(b))
            }
            4 => {
                let ndim = read_u32(cursor)?;
                let mut shape = Vec::with_capacity((ndim as usize).min(bytes_left(cursor)));
                for _ in 0..ndim {
                    shape.push(read_u32(cursor)?);
                }
                let n_elements = read_u32(cursor)?;
                let mut data = Vec::with_capacity((n_elements as usize).min(bytes_left(cursor)));
                for _ in 0..n_elements {
                    let mut b = [0u8; 4];
                    read_exact(cursor, &mut b)?;
                    data.push(f32::from_le_bytes(b));
                }
                BatchResult::Tensor { shape, data }
            }
            5 => {
                let mut b = [0u8; 32];
                read_exact(cursor, &mut b)?;
                BatchResult::Handle(Digest(b))
            }
            6 => {
                let len = read_u32(cursor)? as usize;
                let mut bytes = vec![0u8; len];
                read_exact(cursor, &mut bytes)?;
                let msg = String::from_utf8(bytes).map_err(|e| HlxError::LcParse(e.to_string()))?;
                BatchResult::Error(msg)
            }
            other => return Err(HlxError::LcParse(format!("unknown result kind byte {other}"))),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchResponse {
    Success(Vec<BatchResult>),
    Error(String),
}

impl BatchResponse {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            BatchResponse::Error(msg) => {
                buf.push(1);
                let bytes = msg.as_bytes();
                write_u32(&mut buf, bytes.len() as u32);
                buf.extend_from_slice(bytes);
            }
            BatchResponse::Success(results) => {
                buf.push(0);
                write_u32(&mut buf, results.len() as u32);
                for result in results {
                    result.encode(&mut buf);
                }
            }
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, HlxError> {
        let mut cursor = Cursor::new(bytes);
        let mut status = [0u8; 1];
        read_exact(&mut cursor, &mut status)?;
        match status[0] {
            1 => {
                let len = read_u32(&mut cursor)? as usize;
                let mut msg_bytes = vec![0u8; len];
                read_exact(&mut cursor, &mut msg_bytes)?;
                let msg = String::from_utf8(msg_bytes).map_err(|e| HlxError::LcParse(e.to_string()))?;
                Ok(BatchResponse::Error(msg))
            }
            0 => {
                let n = read_u32(&mut cursor)?;
                let mut results = Vec::with_capacity((n as usize).min(bytes_left(&cursor)));
                for _ in 0..n {
                    results.push(BatchResult::decode(&mut cursor)?);
                }
                Ok(BatchResponse::Success(results))
            }
            other => Err(HlxError::LcParse(format!("unknown response status byte {other}"))),
        }
    }
}

/// A batch parameter value carrying a `ChainRef` payload.
pub fn is_chain_ref(value: &Value) -> Option<ChainRef> {
    match value {
        Value::ChainRef(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> BatchRequest {
        BatchRequest::new(
            [7u8; 32],
            vec![Instruction::new(
                906,
                vec![("m".to_string(), Value::Int(2)), ("k".to_string(), Value::Int(3))],
            )],
        )
    }

    #[test]
    fn request_with_chained_params_round_trips() {
        let request = sample_request();
        let encoded = request.encode();
        let decoded = BatchRequest::decode(&encoded).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn decode_rejects_bad_magic() {
        let mut encoded = sample_request().encode();
        encoded[0] ^= 0xFF;
        assert!(matches!(BatchRequest::decode(&encoded), Err(HlxError::MagicMismatch { .. })));
    }

    #[test]
    fn decode_rejects_unsupported_version() {
        let mut encoded = sample_request().encode();
        encoded[4] = 99;
        assert!(matches!(BatchRequest::decode(&encoded), Err(HlxError::VersionUnsupported(99))));
    }

    #[test]
    fn single_byte_trailer_mutation_is_rejected() {
        let mut encoded = sample_request().encode();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;
        assert!(matches!(BatchRequest::decode(&encoded), Err(HlxError::TrailerMismatch)));
    }

    #[test]
    fn chain_ref_params_round_trip() {
        let request = BatchRequest::new(
            [0u8; 32],
            vec![
                Instruction::new(906, vec![]),
                Instruction::new(909, vec![("input".to_string(), Value::ChainRef(ChainRef::From(0)))]),
            ],
        );
        let encoded = request.encode();
        assert_eq!(BatchRequest::decode(&encoded).unwrap(), request);
    }

    #[test]
    fn response_success_round_trips() {
        let response = BatchResponse::Success(vec![
            BatchResult::Int(42),
            BatchResult::Tensor { shape: vec![2], data: vec![1.0, 2.0] },
            BatchResult::Handle(Digest([9u8; 32])),
            BatchResult::Error("partial failure".into()),
        ]);
        let encoded = response.encode();
        assert_eq!(BatchResponse::decode(&encoded).unwrap(), response);
    }

    #[test]
    fn response_error_round_trips() {
        let response = BatchResponse::Error("contract 42 unknown".into());
        let encoded = response.encode();
        assert_eq!(BatchResponse::decode(&encoded).unwrap(), response);
    }

    #[test]
    fn decode_rejects_truncated_frame() {
        let encoded = sample_request().encode();
        assert!(BatchRequest::decode(&encoded[..encoded.len() - 40]).is_err());
    }
}
