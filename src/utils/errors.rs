// src/utils/errors.rs
//! Engine error types
//!
//! `EngineError` covers configuration-time failures. Errors raised by targets
//! and interceptors at call time travel as `anyhow::Error` and are never
//! wrapped by the engine.

use thiserror::Error;

/// Errors raised while assembling or activating proxies
#[derive(Debug, Error)]
pub enum EngineError {
    /// Mutation attempted on a frozen proxy configuration
    #[error("Cannot modify frozen proxy configuration: {0}")]
    ConfigFrozen(String),

    /// No adapter understands the given advice kind
    #[error("Unknown advice type: {0}")]
    UnknownAdviceType(String),

    /// Full-type proxying requested but the target type is unknown
    #[error("Cannot determine target type for proxy: {0}")]
    NoTargetType(String),

    /// Advisor position outside the advisor list
    #[error("Advisor index {index} out of bounds (advisor count {len})")]
    AdvisorIndexOutOfBounds { index: usize, len: usize },

    /// Method not exposed by a proxy or target
    #[error("Method '{method}' is not exposed by {owner}")]
    NoSuchMethod { method: String, owner: String },

    /// Interceptor chain reached the joinpoint but no target is available
    #[error("No target available to invoke '{0}'")]
    NoTarget(String),

    /// No proxy exposed on the current thread
    #[error("Cannot find current proxy: set 'expose_proxy' to make it available")]
    NoCurrentProxy,

    /// No invocation exposed on the current thread
    #[error("No invocation in progress: add the expose-invocation advisor to the chain")]
    NoCurrentInvocation,

    /// A listener refused activation
    #[error("Proxy activation failed: {0}")]
    ActivationFailed(String),

    /// General configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// Tracing or metrics initialization failed
    #[error("Observability error: {0}")]
    ObservabilityError(String),
}

/// Result type for engine configuration operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::AdvisorIndexOutOfBounds { index: 3, len: 1 };
        assert_eq!(
            err.to_string(),
            "Advisor index 3 out of bounds (advisor count 1)"
        );

        let err = EngineError::ConfigFrozen("add_advisor".to_string());
        assert!(err.to_string().contains("frozen"));
    }

    #[test]
    fn test_engine_error_converts_to_anyhow() {
        let err: anyhow::Error = EngineError::NoTarget("save".to_string()).into();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::NoTarget(_))
        ));
    }
}
