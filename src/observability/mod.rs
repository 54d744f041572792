// src/observability/mod.rs
//! Logging and metrics setup
//!
//! The engine emits `tracing` events and `metrics` counters unconditionally;
//! this module installs the subscriber and the Prometheus recorder that
//! consume them. Both are process-global and may only be installed once.
//!
//! Counters:
//!
//! - `weave_proxy_invocations_total{shape}`: calls entering a proxy
//! - `weave_chain_cache_misses_total`: interceptor chains computed
//! - `weave_proxies_created_total{shape}`: proxies handed out

use crate::utils::config::ObservabilityConfig;
use crate::utils::errors::{EngineError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const PROXY_INVOCATIONS: &str = "weave_proxy_invocations_total";
pub const CHAIN_CACHE_MISSES: &str = "weave_chain_cache_misses_total";
pub const PROXIES_CREATED: &str = "weave_proxies_created_total";

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `config.log_level` when set.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| EngineError::ObservabilityError(format!("Invalid log filter: {}", e)))?;

    let json = config.json_logs;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init()
        .map_err(|e| EngineError::ObservabilityError(format!("Failed to install subscriber: {}", e)))
}

/// Install the Prometheus recorder and describe the engine counters
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| EngineError::ObservabilityError(format!("Failed to install recorder: {}", e)))?;

    metrics::describe_counter!(PROXY_INVOCATIONS, "Method calls entering a proxy");
    metrics::describe_counter!(CHAIN_CACHE_MISSES, "Interceptor chains computed on cache miss");
    metrics::describe_counter!(PROXIES_CREATED, "Proxies created from a configuration");

    info!("Prometheus metrics recorder installed");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = ObservabilityConfig {
            log_level: "sentra_weave=loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            init_tracing(&config),
            Err(EngineError::ObservabilityError(_))
        ));
    }
}
