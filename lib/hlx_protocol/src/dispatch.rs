//! Dispatch shell: a process-wide, read-only-after-build
//! registry mapping `contract_id` to a [`Handler`], plus [`evaluate_batch`]
//! implementing the batch's chaining and error-propagation contract.

use crate::batch::{BatchRequest, BatchResponse, BatchResult};
use crate::error::HlxError;
use async_trait::async_trait;
use hlx_value::{ChainRef, Value, ValueKind};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A single declared parameter a [`Handler`] expects: a name and the
/// `Value` kind it must resolve to once chain references are substituted.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl ParamSpec {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        ParamSpec { name, kind }
    }
}

/// Fully-resolved parameters handed to a handler: every `ChainRef` has
/// already been substituted for the `Value` it pointed to.
pub type ParamEnv = HashMap<String, Value>;

/// A contract handler. Side effects (GPU dispatch, storage writes) are
/// the handler's own responsibility — `evaluate_batch` only sequences
/// calls and resolves chaining; handlers are otherwise pure functions of
/// their parameter environment.
#[async_trait]
pub trait Handler: Send + Sync {
    fn params(&self) -> &[ParamSpec];
    async fn call(&self, env: ParamEnv) -> Result<BatchResult, HlxError>;
}

/// Process-wide map from `contract_id` to handler, built once at startup
/// and immutable thereafter.
pub struct HandlerRegistry {
    handlers: BTreeMap<u32, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder { handlers: BTreeMap::new() }
    }

    pub fn get(&self, contract_id: u32) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(&contract_id)
    }
}

pub struct HandlerRegistryBuilder {
    handlers: BTreeMap<u32, Arc<dyn Handler>>,
}

impl HandlerRegistryBuilder {
    pub fn register(mut self, contract_id: u32, handler: impl Handler + 'static) -> Self {
        self.handlers.insert(contract_id, Arc::new(handler));
        self
    }

    pub fn build(self) -> Arc<HandlerRegistry> {
        Arc::new(HandlerRegistry { handlers: self.handlers })
    }
}

/// Evaluates every instruction in `request` in ascending index order
///, resolving `ChainRef` parameters against prior results and
/// validating declared parameter kinds before invoking the handler
///. Any dispatch-time error aborts the whole batch and
/// produces a single `BatchResponse::Error` with no partial results
/// — except a handler returning
/// `BatchResult::Error` itself, which is per-instruction and does not
/// abort the batch.
#[tracing::instrument(skip(request, registry), fields(n_instructions = request.instructions.len()))]
pub async fn evaluate_batch(request: &BatchRequest, registry: &HandlerRegistry) -> BatchResponse {
    let mut results: Vec<BatchResult> = Vec::with_capacity(request.instructions.len());

    for (index, instruction) in request.instructions.iter().enumerate() {
        match evaluate_instruction(index, instruction, &results, registry).await {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::warn!(contract_id = instruction.contract_id, error = %e, "batch aborted");
                return BatchResponse::Error(e.to_string());
            }
        }
    }

    BatchResponse::Success(results)
}

async fn evaluate_instruction(
    index: usize,
    instruction: &crate::batch::Instruction,
    prior_results: &[BatchResult],
    registry: &HandlerRegistry,
) -> Result<BatchResult, HlxError> {
    let handler = registry
        .get(instruction.contract_id)
        .ok_or(HlxError::ContractUnknown(instruction.contract_id))?;

    let mut resolved: HashMap<String, Value> = HashMap::with_capacity(instruction.params.len());
    for (name, value) in &instruction.params {
        resolved.insert(name.clone(), resolve_param(index, value, prior_results)?);
    }

    let mut env: ParamEnv = HashMap::with_capacity(handler.params().len());
    for spec in handler.params() {
        let value = resolved
            .get(spec.name)
            .ok_or_else(|| HlxError::ParamMissing { contract_id: instruction.contract_id, name: spec.name.to_string() })?;
        if value.kind() != spec.kind {
            return Err(HlxError::ParamTypeMismatch {
                contract_id: instruction.contract_id,
                name: spec.name.to_string(),
                expected: spec.kind,
                actual: value.kind(),
            });
        }
        env.insert(spec.name.to_string(), value.clone());
    }

    handler.call(env).await.map_err(|e| match e {
        // A handler that itself detects a shape/content mismatch (e.g. a
        // tensor handler validating a chained-in shape) reports it as
        // the same dispatch-level error a kind mismatch would produce,
        // rather than burying it inside HandlerFailed's opaque message.
        HlxError::ParamTypeMismatch { .. } => e,
        other => HlxError::HandlerFailed { contract_id: instruction.contract_id, message: other.to_string() },
    })
}

fn resolve_param(index: usize, value: &Value, prior_results: &[BatchResult]) -> Result<Value, HlxError> {
    let target = match value {
        Value::ChainRef(ChainRef::Previous) => {
            if index == 0 {
                return Err(HlxError::ChainOutOfRange { index });
            }
            index - 1
        }
        Value::ChainRef(ChainRef::From(k)) => {
            let k = *k as usize;
            if k >= index {
                return Err(HlxError::ChainForwardRef { index, target: k });
            }
            k
        }
        other => return Ok(other.clone()),
    };

    let result = prior_results.get(target).ok_or(HlxError::ChainOutOfRange { index })?;
    result.as_chained_value().ok_or(HlxError::ChainOutOfRange { index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Instruction;

    struct Echo {
        params: Vec<ParamSpec>,
    }

    #[async_trait]
    impl Handler for Echo {
        fn params(&self) -> &[ParamSpec] {
            &self.params
        }

        async fn call(&self, env: ParamEnv) -> Result<BatchResult, HlxError> {
            match env.get(self.params[0].name) {
                Some(Value::Int(i)) => Ok(BatchResult::Int(*i)),
                _ => Ok(BatchResult::Null),
            }
        }
    }

    struct Failing;

    #[async_trait]
    impl Handler for Failing {
        fn params(&self) -> &[ParamSpec] {
            &[]
        }

        async fn call(&self, _env: ParamEnv) -> Result<BatchResult, HlxError> {
            Err(HlxError::LcParse("boom".into()))
        }
    }

    fn registry() -> Arc<HandlerRegistry> {
        HandlerRegistry::builder()
            .register(906, Echo { params: vec![ParamSpec::new("n", ValueKind::Int)] })
            .register(909, Echo { params: vec![ParamSpec::new("input", ValueKind::Int)] })
            .register(999, Failing)
            .build()
    }

    #[tokio::test]
    async fn instructions_run_in_ascending_order_exactly_once() {
        let request = BatchRequest::new(
            [0u8; 32],
            vec![
                Instruction::new(906, vec![("n".to_string(), Value::Int(1))]),
                Instruction::new(906, vec![("n".to_string(), Value::Int(2))]),
                Instruction::new(906, vec![("n".to_string(), Value::Int(3))]),
            ],
        );
        let response = evaluate_batch(&request, &registry()).await;
        assert_eq!(
            response,
            BatchResponse::Success(vec![BatchResult::Int(1), BatchResult::Int(2), BatchResult::Int(3)])
        );
    }

    #[tokio::test]
    async fn chain_from_resolves_to_the_target_result() {
        let request = BatchRequest::new(
            [0u8; 32],
            vec![
                Instruction::new(906, vec![("n".to_string(), Value::Int(7))]),
                Instruction::new(909, vec![("input".to_string(), Value::ChainRef(ChainRef::From(0)))]),
            ],
        );
        let response = evaluate_batch(&request, &registry()).await;
        assert_eq!(response, BatchResponse::Success(vec![BatchResult::Int(7), BatchResult::Int(7)]));
    }

    #[tokio::test]
    async fn chain_previous_resolves_to_the_immediately_preceding_result() {
        let request = BatchRequest::new(
            [0u8; 32],
            vec![
                Instruction::new(906, vec![("n".to_string(), Value::Int(11))]),
                Instruction::new(909, vec![("input".to_string(), Value::ChainRef(ChainRef::Previous))]),
            ],
        );
        let response = evaluate_batch(&request, &registry()).await;
        assert_eq!(response, BatchResponse::Success(vec![BatchResult::Int(11), BatchResult::Int(11)]));
    }

    #[tokio::test]
    async fn chain_from_forward_reference_fails_the_whole_batch() {
        let request = BatchRequest::new(
            [0u8; 32],
            vec![Instruction::new(909, vec![("input".to_string(), Value::ChainRef(ChainRef::From(0)))])],
        );
        let response = evaluate_batch(&request, &registry()).await;
        assert!(matches!(response, BatchResponse::Error(_)));
    }

    #[tokio::test]
    async fn unknown_contract_id_fails_the_batch() {
        let request = BatchRequest::new([0u8; 32], vec![Instruction::new(12345, vec![])]);
        let response = evaluate_batch(&request, &registry()).await;
        assert!(matches!(response, BatchResponse::Error(_)));
    }

    #[tokio::test]
    async fn missing_param_fails_the_batch() {
        let request = BatchRequest::new([0u8; 32], vec![Instruction::new(906, vec![])]);
        let response = evaluate_batch(&request, &registry()).await;
        assert!(matches!(response, BatchResponse::Error(_)));
    }

    #[tokio::test]
    async fn chained_param_type_mismatch_fails_the_whole_batch() {
        let request = BatchRequest::new(
            [0u8; 32],
            vec![
                Instruction::new(906, vec![("n".to_string(), Value::Text("not an int".to_string()))]),
            ],
        );
        let response = evaluate_batch(&request, &registry()).await;
        assert!(matches!(response, BatchResponse::Error(_)));
    }

    #[tokio::test]
    async fn handler_error_wraps_as_handler_failed_and_aborts_batch() {
        let request = BatchRequest::new([0u8; 32], vec![Instruction::new(999, vec![])]);
        let response = evaluate_batch(&request, &registry()).await;
        assert!(matches!(response, BatchResponse::Error(_)));
    }
}
