// src/target/mod.rs
//! Targets and target sources
//!
//! A [`Target`] is the plain object behind a proxy. Calls reach it through a
//! dispatch table keyed by method name; arguments and results are JSON
//! values so any business object can sit behind a proxy without generated
//! code.
//!
//! - **sources**: Singleton, empty, prototype, and hot-swappable sources
//! - **pool**: Bounded pool of reusable targets

pub mod pool;
pub mod sources;

use crate::meta::{Method, TypeInfo};
use crate::utils::errors::EngineError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use pool::{PoolStats, PooledTargetSource, PooledTargetSourceConfig};
pub use sources::{
    EmptyTargetSource, HotSwappableTargetSource, PrototypeTargetSource, SingletonTargetSource,
};

/// Argument and return value currency
pub type Value = serde_json::Value;

/// An object that can sit behind a proxy
pub trait Target: Send + Sync + 'static {
    /// Structural type of this object
    fn type_info(&self) -> Arc<TypeInfo>;

    /// Perform the real call
    fn invoke(&self, method: &Method, args: &[Value]) -> anyhow::Result<Value>;

    fn as_any(&self) -> &dyn Any;
}

/// Indirection over the object behind a proxy
pub trait TargetSource: Send + Sync {
    /// Type of the targets this source hands out, if known up front
    fn target_type(&self) -> Option<Arc<TypeInfo>>;

    /// `true` when every `get_target` returns the same instance, so the
    /// engine may fetch it once per call without scoping a release.
    fn is_static(&self) -> bool;

    /// Fetch the target (`None` for interface-only proxies)
    fn get_target(&self) -> anyhow::Result<Option<Arc<dyn Target>>>;

    /// Return a target obtained from `get_target`
    fn release_target(&self, _target: Arc<dyn Target>) -> anyhow::Result<()> {
        Ok(())
    }
}

type Handler = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Target backed by a method-name dispatch table
pub struct DispatchTarget {
    type_info: Arc<TypeInfo>,
    handlers: HashMap<String, Handler>,
}

impl DispatchTarget {
    pub fn builder(type_info: Arc<TypeInfo>) -> DispatchTargetBuilder {
        DispatchTargetBuilder {
            type_info,
            handlers: HashMap::new(),
        }
    }

    /// Whether a handler is registered for `method`
    pub fn handles(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }
}

impl Target for DispatchTarget {
    fn type_info(&self) -> Arc<TypeInfo> {
        Arc::clone(&self.type_info)
    }

    fn invoke(&self, method: &Method, args: &[Value]) -> anyhow::Result<Value> {
        match self.handlers.get(method.name()) {
            Some(handler) => handler(args),
            None => Err(EngineError::NoSuchMethod {
                method: method.name().to_string(),
                owner: self.type_info.name().to_string(),
            }
            .into()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.handlers.keys().collect();
        methods.sort();
        f.debug_struct("DispatchTarget")
            .field("type", &self.type_info.name())
            .field("methods", &methods)
            .finish()
    }
}

/// Builder for [`DispatchTarget`]
pub struct DispatchTargetBuilder {
    type_info: Arc<TypeInfo>,
    handlers: HashMap<String, Handler>,
}

impl DispatchTargetBuilder {
    /// Register the handler for `method`
    pub fn on<F>(mut self, method: &str, handler: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(method.to_string(), Arc::new(handler));
        self
    }

    pub fn build(self) -> Arc<DispatchTarget> {
        Arc::new(DispatchTarget {
            type_info: self.type_info,
            handlers: self.handlers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Capability;
    use serde_json::json;

    fn echo_target() -> Arc<DispatchTarget> {
        let echo = Capability::builder("Echo").method("echo").build();
        let ty = TypeInfo::builder("EchoImpl").implements(echo).build();
        DispatchTarget::builder(ty)
            .on("echo", |args| Ok(args.first().cloned().unwrap_or(Value::Null)))
            .build()
    }

    #[test]
    fn test_dispatch_by_name() {
        let target = echo_target();
        let result = target
            .invoke(&Method::new("Echo", "echo"), &[json!("hello")])
            .unwrap();
        assert_eq!(result, json!("hello"));
        assert!(target.handles("echo"));
    }

    #[test]
    fn test_unknown_method() {
        let target = echo_target();
        let err = target.invoke(&Method::new("Echo", "shout"), &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::NoSuchMethod { .. })
        ));
    }

    #[test]
    fn test_as_any_downcast() {
        let target: Arc<dyn Target> = echo_target();
        assert!(target.as_any().downcast_ref::<DispatchTarget>().is_some());
    }
}
