//! Illustrative handlers for the GPU/tensor contract-id tier
//! (900-999). Real kernel dispatch (Vulkan compute, the transformer
//! forward/backward pass, the Adam optimizer) lives outside this
//! workspace; these stand-ins are echo/identity-shaped so a batch that
//! chains `gemm` into `softmax` exercises the dispatcher's chaining and
//! tensor pack/unpack path end to end without claiming to compute real
//! tensor math.

use async_trait::async_trait;
use hlx_codec_b::{pack_tensor, unpack_tensor};
use hlx_protocol::{BatchResult, Handler, HlxError, ParamEnv, ParamSpec};
use hlx_store::{HlxStore, StorePutOptions};
use hlx_value::{Value, ValueKind};
use std::sync::Arc;

pub const VULKAN_SHADER: u32 = 900;
pub const TENSOR_GEMM: u32 = 906;
pub const TENSOR_SOFTMAX: u32 = 909;

fn tensor_param(env: &ParamEnv, name: &str) -> Result<(Vec<u32>, Vec<f32>), HlxError> {
    match env.get(name) {
        Some(Value::Bytes(bytes)) => unpack_tensor(bytes).map_err(HlxError::from),
        _ => unreachable!("dispatcher already validated {name} as ValueKind::Bytes"),
    }
}

/// Stand-in for `TENSOR_GEMM`: echoes operand `a` back as the result
/// rather than computing `a @ b`. Exercises the same `m`/`k`/`n`/
/// `transpose_a`/`transpose_b` parameter surface the original client
/// sends, without performing matrix multiplication.
pub struct TensorGemm;

#[async_trait]
impl Handler for TensorGemm {
    fn params(&self) -> &[ParamSpec] {
        const PARAMS: [ParamSpec; 5] = [
            ParamSpec::new("a", ValueKind::Bytes),
            ParamSpec::new("b", ValueKind::Bytes),
            ParamSpec::new("m", ValueKind::Int),
            ParamSpec::new("k", ValueKind::Int),
            ParamSpec::new("n", ValueKind::Int),
        ];
        &PARAMS
    }

    async fn call(&self, env: ParamEnv) -> Result<BatchResult, HlxError> {
        let (shape, data) = tensor_param(&env, "a")?;
        Ok(BatchResult::Tensor { shape, data })
    }
}

/// Stand-in for `TENSOR_SOFTMAX`: echoes `input` back unchanged. Declares
/// `input` as `ValueKind::Bytes` so a prior `gemm` result (itself a
/// `BatchResult::Tensor`, chained via `as_chained_value`) type-checks
/// against it.
///
/// Softmax is only defined over a vector or a batch of vectors, so a
/// chained-in tensor of rank 0 or rank 3+ is not a shape this contract
/// can accept — `ValueKind::Bytes` alone can't express that, so the
/// rank check is done here and reported as `ParamTypeMismatch` against
/// `ValueKind::Bytes` for both `expected` and `actual`.
pub struct TensorSoftmax;

#[async_trait]
impl Handler for TensorSoftmax {
    fn params(&self) -> &[ParamSpec] {
        const PARAMS: [ParamSpec; 1] = [ParamSpec::new("input", ValueKind::Bytes)];
        &PARAMS
    }

    async fn call(&self, env: ParamEnv) -> Result<BatchResult, HlxError> {
        let (shape, data) = tensor_param(&env, "input")?;
        if shape.is_empty() || shape.len() > 2 {
            return Err(HlxError::ParamTypeMismatch {
                contract_id: TENSOR_SOFTMAX,
                name: "input".to_string(),
                expected: ValueKind::Bytes,
                actual: ValueKind::Bytes,
            });
        }
        let repacked = pack_tensor(&shape, &data)?;
        let (shape, data) = unpack_tensor(&repacked)?;
        Ok(BatchResult::Tensor { shape, data })
    }
}

/// Stores a SPIR-V shader blob in the CAS and returns its handle.
/// Validates and persists; the compute pipeline that would consume the
/// stored bytes is not this crate's concern.
pub struct VulkanShaderPut {
    store: Arc<HlxStore>,
}

impl VulkanShaderPut {
    pub fn new(store: Arc<HlxStore>) -> Self {
        VulkanShaderPut { store }
    }
}

#[async_trait]
impl Handler for VulkanShaderPut {
    fn params(&self) -> &[ParamSpec] {
        const PARAMS: [ParamSpec; 1] = [ParamSpec::new("bytes", ValueKind::Bytes)];
        &PARAMS
    }

    async fn call(&self, env: ParamEnv) -> Result<BatchResult, HlxError> {
        let bytes = match env.get("bytes") {
            Some(Value::Bytes(bytes)) => bytes,
            _ => unreachable!("dispatcher already validated bytes as ValueKind::Bytes"),
        };
        let options = StorePutOptions { validate_spirv: true, ..Default::default() };
        let handle = self
            .store
            .put(bytes, options)
            .await
            .map_err(|e| HlxError::HandlerFailed { contract_id: VULKAN_SHADER, message: e.to_string() })?;
        Ok(BatchResult::Handle(handle.digest()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn gemm_stand_in_echoes_operand_a() {
        let packed = pack_tensor(&[2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut env: ParamEnv = HashMap::new();
        env.insert("a".to_string(), Value::Bytes(packed));
        let result = TensorGemm.call(env).await.unwrap();
        assert_eq!(result, BatchResult::Tensor { shape: vec![2, 2], data: vec![1.0, 2.0, 3.0, 4.0] });
    }

    #[tokio::test]
    async fn softmax_stand_in_echoes_input() {
        let packed = pack_tensor(&[3], &[0.1, 0.2, 0.7]).unwrap();
        let mut env: ParamEnv = HashMap::new();
        env.insert("input".to_string(), Value::Bytes(packed));
        let result = TensorSoftmax.call(env).await.unwrap();
        assert_eq!(result, BatchResult::Tensor { shape: vec![3], data: vec![0.1, 0.2, 0.7] });
    }

    #[tokio::test]
    async fn softmax_rejects_a_rank_incompatible_shape() {
        let packed = pack_tensor(&[2, 2, 1], &[0.1, 0.2, 0.3, 0.4]).unwrap();
        let mut env: ParamEnv = HashMap::new();
        env.insert("input".to_string(), Value::Bytes(packed));
        let result = TensorSoftmax.call(env).await;
        assert!(matches!(
            result,
            Err(HlxError::ParamTypeMismatch { contract_id: TENSOR_SOFTMAX, .. })
        ));
    }

    fn spirv_blob() -> Vec<u8> {
        vec![0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]
    }

    #[tokio::test]
    async fn vulkan_shader_put_stores_and_returns_a_handle() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(HlxStore::open(dir.path()).await.unwrap());
        let handler = VulkanShaderPut::new(store.clone());

        let mut env: ParamEnv = HashMap::new();
        env.insert("bytes".to_string(), Value::Bytes(spirv_blob()));
        let result = handler.call(env).await.unwrap();

        let digest = match result {
            BatchResult::Handle(digest) => digest,
            other => panic!("expected a Handle result, got {other:?}"),
        };
        let handle = hlx_value::Handle::new(hlx_value::TAG_SHADER, digest);
        assert_eq!(store.get(&handle).await.unwrap(), spirv_blob());
    }

    #[tokio::test]
    async fn vulkan_shader_put_rejects_non_spirv_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(HlxStore::open(dir.path()).await.unwrap());
        let handler = VulkanShaderPut::new(store);

        let mut env: ParamEnv = HashMap::new();
        env.insert("bytes".to_string(), Value::Bytes(b"not spir-v".to_vec()));
        let result = handler.call(env).await;
        assert!(matches!(result, Err(HlxError::HandlerFailed { .. })));
    }
}
