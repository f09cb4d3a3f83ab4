use anyhow::Context as _;
use serde::Deserialize;
use std::path::PathBuf;

fn default_cas_root() -> PathBuf {
    PathBuf::from("./hlx-cas")
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/hlx_vulkan.sock")
}

fn default_worker_pool_size() -> usize {
    num_cpus::get()
}

fn default_batch_deadline_ms() -> u64 {
    30_000
}

/// Process configuration, loaded from `HLX_`-prefixed environment
/// variables and overridable by a handful of CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct HlxConfig {
    #[serde(default = "default_cas_root")]
    pub cas_root: PathBuf,
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,
    #[serde(default = "default_batch_deadline_ms")]
    pub batch_deadline_ms: u64,
}

impl HlxConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        envy::prefixed("HLX_")
            .from_env()
            .with_context(|| "Cannot load config <hlx_server>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_with_no_environment_variables_set() {
        // envy::prefixed only sees vars starting with HLX_; absent any,
        // every field falls back to its default_* function.
        let config = HlxConfig::from_env();
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.socket_path, default_socket_path());
        assert_eq!(config.batch_deadline_ms, default_batch_deadline_ms());
        assert!(config.worker_pool_size >= 1);
    }
}
