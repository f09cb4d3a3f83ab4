//! The HLX batch dispatch socket service: loads configuration, opens the
//! content-addressed store, populates the handler registry, and serves
//! connections until interrupted.

mod config;
mod handlers;
mod server;

use anyhow::Context as _;
use clap::Parser;
use hlx_protocol::HandlerRegistry;
use hlx_store::HlxStore;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::HlxConfig;
use crate::server::ServerConfig;

/// Overrides for the handful of settings worth flipping from the command
/// line; everything else comes from `HLX_`-prefixed environment
/// variables.
#[derive(Parser, Debug)]
#[command(name = "hlx_server", about = "HLX batch dispatch socket service")]
struct Cli {
    #[arg(long)]
    socket_path: Option<PathBuf>,
    #[arg(long)]
    cas_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = HlxConfig::from_env().context("loading HlxConfig from the environment")?;
    if let Some(socket_path) = cli.socket_path {
        config.socket_path = socket_path;
    }
    if let Some(cas_root) = cli.cas_root {
        config.cas_root = cas_root;
    }

    tracing::info!(
        cas_root = %config.cas_root.display(),
        socket_path = %config.socket_path.display(),
        worker_pool_size = config.worker_pool_size,
        batch_deadline_ms = config.batch_deadline_ms,
        "starting hlx_server",
    );

    let store = HlxStore::open(&config.cas_root)
        .await
        .with_context(|| format!("opening CAS at {}", config.cas_root.display()))?;
    let store = std::sync::Arc::new(store);

    let registry = HandlerRegistry::builder()
        .register(handlers::VULKAN_SHADER, handlers::VulkanShaderPut::new(store.clone()))
        .register(handlers::TENSOR_GEMM, handlers::TensorGemm)
        .register(handlers::TENSOR_SOFTMAX, handlers::TensorSoftmax)
        .build();

    server::serve(
        &config.socket_path,
        registry,
        ServerConfig {
            worker_pool_size: config.worker_pool_size,
            batch_deadline: Duration::from_millis(config.batch_deadline_ms),
        },
    )
    .await
    .context("server loop exited")
}
