// src/lib.rs
//! Sentra Weave Interception Engine Library
//!
//! This library weaves cross-cutting behavior (logging, transactions,
//! security checks, ...) around method calls on ordinary targets by handing
//! out proxies that run an ordered interceptor chain before the real call.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **meta**: Type, capability and method metadata
//! - **target**: Invocable targets and the sources that supply them
//! - **matching**: Class filters, method matchers and pointcuts
//! - **advice**: Advice shapes, advisors and the adapter registry
//! - **interception**: Chain construction, invocation and thread context
//! - **proxy**: Proxy configuration, strategy selection and proxies
//! - **autoproxy**: Automatic proxying of named candidates
//! - **transaction**: Declarative transactions built on the engine
//! - **observability**: Tracing subscriber and metrics recorder setup
//! - **utils**: Configuration and error types
//!
//! ```text
//! caller ──► Proxy ──► [interceptor 0] ──► [interceptor 1] ──► ... ──► Target
//!                          ▲ proceed()          ▲ proceed()
//!                          └─ ProxyConfig: advisors → cached chain per method
//! ```

// Public module exports
pub mod advice;
pub mod autoproxy;
pub mod interception;
pub mod matching;
pub mod meta;
pub mod observability;
pub mod proxy;
pub mod target;
pub mod transaction;
pub mod utils;

// Re-export commonly used types
pub use advice::{Advice, Advisor};
pub use autoproxy::AutoProxyCreator;
pub use interception::{AopContext, Invocation, MethodInterceptor};
pub use matching::Pointcut;
pub use meta::{Capability, Method, TypeInfo};
pub use proxy::{Proxy, ProxyConfig, ProxyFactory};
pub use target::{DispatchTarget, Target, TargetSource, Value};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Engine build information
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}
