// src/autoproxy/mod.rs
//! Automatic proxying of named candidates
//!
//! The creator sits at two lifecycle touch-points of an object container:
//! before a candidate is instantiated (custom target sources) and after it
//! is initialized (regular wrapping). For each candidate it decides once
//! whether any declared advisor applies and, if so, hands back a proxy.
//!
//! - **creator**: Eligibility, caching and proxy creation
//!
//! # Architecture
//!
//! ```text
//! candidate ("orderService")
//!     │
//!     ├─ infrastructure / ".ORIGINAL"?  → returned unchanged
//!     ├─ eligible advisors (pointcut can_apply)
//!     ├─ extensions (e.g. expose-invocation advisor)
//!     ├─ stable sort by order
//!     └─ ProxyFactory (pre-filtered, common interceptors) → Proxy
//! ```

pub mod creator;

use crate::advice::Advisor;
use crate::interception::ExposeInvocationInterceptor;
use crate::meta::TypeInfo;
use crate::target::TargetSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use creator::AutoProxyCreator;

/// Auto-proxy behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoProxySettings {
    /// Common interceptors run before candidate-specific advisors
    pub apply_common_interceptors_first: bool,

    /// Freeze every generated proxy configuration
    pub freeze_proxies: bool,
}

impl Default for AutoProxySettings {
    fn default() -> Self {
        Self {
            apply_common_interceptors_first: true,
            freeze_proxies: false,
        }
    }
}

/// Adds synthetic advisors to a candidate's eligible list before sorting
pub trait AdvisorExtension: Send + Sync {
    fn extend_advisors(&self, advisors: &mut Vec<Advisor>);
}

/// Prepends the expose-invocation advisor when an eligible advisor reads
/// the current invocation from context
#[derive(Debug, Default)]
pub struct ExposeInvocationExtension;

impl AdvisorExtension for ExposeInvocationExtension {
    fn extend_advisors(&self, advisors: &mut Vec<Advisor>) {
        let needed = advisors.iter().any(|a| a.requires_invocation_context());
        let present = advisors.iter().any(ExposeInvocationInterceptor::is_advisor);
        if needed && !present {
            advisors.insert(0, ExposeInvocationInterceptor::advisor());
        }
    }
}

/// Supplies a custom target source for a candidate before it exists
pub trait TargetSourceCreator: Send + Sync {
    fn target_source(&self, target_type: &Arc<TypeInfo>, name: &str) -> Option<Arc<dyn TargetSource>>;
}
