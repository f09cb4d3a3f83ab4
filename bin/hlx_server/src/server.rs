//! The accept loop: one `tokio::task` per connection, bounded by a
//! semaphore-backed worker pool, each connection running its batches
//! strictly sequentially against a shared, read-only `HandlerRegistry`.

use hlx_protocol::{dispatch::evaluate_batch, frame, BatchRequest, BatchResponse, HandlerRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Semaphore;

pub struct ServerConfig {
    pub worker_pool_size: usize,
    pub batch_deadline: Duration,
}

/// Binds `socket_path` (removing a stale socket file left by a previous
/// run) and serves connections until the process is asked to stop.
pub async fn serve(
    socket_path: &Path,
    registry: Arc<HandlerRegistry>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    let listener = UnixListener::bind(socket_path)?;
    tracing::info!(path = %socket_path.display(), "listening");

    let permits = Arc::new(Semaphore::new(config.worker_pool_size));
    let deadline = config.batch_deadline;

    loop {
        let (stream, _) = listener.accept().await?;
        let registry = registry.clone();
        let permits = permits.clone();

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            handle_connection(stream, &registry, deadline).await;
        });
    }
}

#[tracing::instrument(skip(stream, registry))]
async fn handle_connection<S>(mut stream: S, registry: &HandlerRegistry, deadline: Duration)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let payload = match frame::read_frame(&mut stream, frame::DEFAULT_MAX_FRAME_BYTES).await {
            Ok(payload) => payload,
            Err(hlx_protocol::HlxError::TransportClosed) => return,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read request frame");
                return;
            }
        };

        let response = match BatchRequest::decode(&payload) {
            Ok(request) => match tokio::time::timeout(deadline, evaluate_batch(&request, registry)).await {
                Ok(response) => response,
                Err(_) => {
                    tracing::warn!("batch exceeded deadline");
                    BatchResponse::Error("batch deadline exceeded".to_string())
                }
            },
            Err(e) => BatchResponse::Error(e.to_string()),
        };

        if let Err(e) = frame::write_frame(&mut stream, &response.encode()).await {
            tracing::warn!(error = %e, "failed to write response frame");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hlx_protocol::{dispatch::ParamEnv, BatchResult, Handler, Instruction, ParamSpec};
    use hlx_value::{Value, ValueKind};
    use std::time::Duration;

    struct Slow;

    #[async_trait]
    impl Handler for Slow {
        fn params(&self) -> &[ParamSpec] {
            &[]
        }

        async fn call(&self, _env: ParamEnv) -> Result<BatchResult, hlx_protocol::HlxError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(BatchResult::Null)
        }
    }

    struct Double;

    #[async_trait]
    impl Handler for Double {
        fn params(&self) -> &[ParamSpec] {
            const PARAMS: [ParamSpec; 1] = [ParamSpec::new("n", ValueKind::Int)];
            &PARAMS
        }

        async fn call(&self, env: ParamEnv) -> Result<BatchResult, hlx_protocol::HlxError> {
            match env.get("n") {
                Some(Value::Int(n)) => Ok(BatchResult::Int(n * 2)),
                _ => unreachable!(),
            }
        }
    }

    fn registry() -> Arc<HandlerRegistry> {
        HandlerRegistry::builder().register(1, Double).register(2, Slow).build()
    }

    #[tokio::test]
    async fn serves_a_batch_over_a_duplex_stream() {
        let (mut client, server) = tokio::io::duplex(4096);
        let registry = registry();
        let handle = tokio::spawn(async move {
            handle_connection(server, &registry, Duration::from_secs(5)).await;
        });

        let request = BatchRequest::new([0u8; 32], vec![Instruction::new(1, vec![("n".to_string(), Value::Int(9))])]);
        frame::write_frame(&mut client, &request.encode()).await.unwrap();
        let response_bytes = frame::read_frame(&mut client, frame::DEFAULT_MAX_FRAME_BYTES).await.unwrap();
        let response = BatchResponse::decode(&response_bytes).unwrap();
        assert_eq!(response, BatchResponse::Success(vec![BatchResult::Int(18)]));

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn slow_handler_trips_the_batch_deadline() {
        let (mut client, server) = tokio::io::duplex(4096);
        let registry = registry();
        let handle = tokio::spawn(async move {
            handle_connection(server, &registry, Duration::from_millis(50)).await;
        });

        let request = BatchRequest::new([0u8; 32], vec![Instruction::new(2, vec![])]);
        frame::write_frame(&mut client, &request.encode()).await.unwrap();
        let response_bytes = frame::read_frame(&mut client, frame::DEFAULT_MAX_FRAME_BYTES).await.unwrap();
        let response = BatchResponse::decode(&response_bytes).unwrap();
        assert!(matches!(response, BatchResponse::Error(_)));

        drop(client);
        handle.await.unwrap();
    }
}
