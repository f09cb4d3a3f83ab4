//! The tensor-shaped `Bytes` convention: `u8 ndim, ndim × u32 shape,
//! f32[∏ shape]`, little-endian throughout. This is a convention layered
//! on `Value::Bytes`, not a new LC-B variant — grounded in
//! `hlx_lcb_client.py`'s `tensor_payload` construction.

use crate::error::CodecError;

/// Packs a shape and its row-major `f32` elements into the tensor byte
/// convention. `elements.len()` must equal the product of `shape`.
pub fn pack_tensor(shape: &[u32], elements: &[f32]) -> Result<Vec<u8>, CodecError> {
    if shape.len() > u8::MAX as usize {
        return Err(CodecError::LcEncode(format!(
            "tensor rank {} exceeds u8::MAX",
            shape.len()
        )));
    }
    let expected: u64 = shape.iter().map(|&d| d as u64).product();
    if expected != elements.len() as u64 {
        return Err(CodecError::LcEncode(format!(
            "tensor shape {shape:?} implies {expected} elements, got {}",
            elements.len()
        )));
    }

    let mut buf = Vec::with_capacity(1 + shape.len() * 4 + elements.len() * 4);
    buf.push(shape.len() as u8);
    for dim in shape {
        buf.extend_from_slice(&dim.to_le_bytes());
    }
    for value in elements {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    Ok(buf)
}

/// Inverse of [`pack_tensor`].
pub fn unpack_tensor(bytes: &[u8]) -> Result<(Vec<u32>, Vec<f32>), CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::LcDecode("tensor payload is empty".into()));
    }
    let ndim = bytes[0] as usize;
    let shape_end = 1 + ndim * 4;
    if bytes.len() < shape_end {
        return Err(CodecError::LcDecode("tensor payload truncated in shape header".into()));
    }

    let mut shape = Vec::with_capacity(ndim);
    for chunk in bytes[1..shape_end].chunks_exact(4) {
        shape.push(u32::from_le_bytes(chunk.try_into().unwrap()));
    }

    let expected: u64 = shape.iter().map(|&d| d as u64).product();
    let element_bytes = &bytes[shape_end..];
    if element_bytes.len() as u64 != expected * 4 {
        return Err(CodecError::LcDecode(format!(
            "tensor shape {shape:?} implies {} element bytes, got {}",
            expected * 4,
            element_bytes.len()
        )));
    }

    let elements = element_bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect();
    Ok((shape, elements))
}
