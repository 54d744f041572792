// src/utils/config.rs
//! Engine configuration
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `SENTRA_WEAVE__*` environment variables.

use crate::autoproxy::AutoProxySettings;
use crate::proxy::ProxySettings;
use crate::utils::errors::{EngineError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SENTRA_WEAVE_CONFIG";

/// Default config file stem (`sentra-weave.toml`, `sentra-weave.yaml`, ...)
pub const DEFAULT_CONFIG_STEM: &str = "sentra-weave";

/// Logging and metrics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output
    pub json_logs: bool,

    /// Install the Prometheus metrics recorder
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Flags copied into every proxy configuration
    pub proxy: ProxySettings,

    /// Auto-proxy creator behavior
    pub auto_proxy: AutoProxySettings,

    /// Logging and metrics
    pub observability: ObservabilityConfig,
}

impl EngineConfig {
    /// Load configuration from defaults, optional file, and environment
    pub fn load() -> Result<Self> {
        let file_source = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => File::with_name(&path).required(true),
            Err(_) => File::with_name(DEFAULT_CONFIG_STEM).required(false),
        };

        let settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("SENTRA_WEAVE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        debug!("Loaded engine configuration: {:?}", config);
        Ok(config)
    }

    /// Load configuration from an explicit file (format from extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_str().ok_or_else(|| {
            EngineError::ConfigError(format!("Non UTF-8 config path: {}", path.display()))
        })?;

        let settings = Config::builder()
            .add_source(File::with_name(path_str).required(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| EngineError::ConfigError(format!("Failed to render config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(!config.proxy.expose_proxy);
        assert!(!config.proxy.frozen);
        assert!(config.auto_proxy.apply_common_interceptors_first);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[proxy]\nexpose_proxy = true\nproxy_target_type = true\n\n[auto_proxy]\nfreeze_proxies = true\n\n[observability]\njson_logs = true"
        )
        .unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert!(config.proxy.expose_proxy);
        assert!(config.proxy.proxy_target_type);
        assert!(!config.proxy.opaque);
        assert!(config.auto_proxy.freeze_proxies);
        assert!(config.observability.json_logs);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = EngineConfig::from_file("/nonexistent/sentra-weave.toml");
        assert!(matches!(result, Err(EngineError::Settings(_))));
    }

    #[test]
    fn test_to_yaml() {
        let yaml = EngineConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("expose_proxy"));
        assert!(yaml.contains("apply_common_interceptors_first"));
    }
}
