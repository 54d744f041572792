// src/interception/context.rs
//! Thread-bound call context
//!
//! - [`AopContext`]: the proxy currently handling a call on this thread,
//!   when the configuration exposes it
//! - [`ExposeInvocationInterceptor`]: publishes the current invocation for
//!   advice that reads it from context instead of from its arguments

use crate::advice::{Advice, Advisor, HIGHEST_PRECEDENCE};
use crate::interception::{Invocation, MethodInterceptor};
use crate::meta::{Method, TypeInfo};
use crate::proxy::Proxy;
use crate::target::Value;
use crate::utils::errors::{EngineError, Result};
use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
    static CURRENT_PROXY: RefCell<Option<Arc<Proxy>>> = RefCell::new(None);
    static CURRENT_INVOCATIONS: RefCell<Vec<InvocationSnapshot>> = RefCell::new(Vec::new());
}

/// Access to the proxy currently handling a call on this thread
pub struct AopContext;

impl AopContext {
    /// The exposed proxy; fails outside a call or when exposure is off
    pub fn current_proxy() -> Result<Arc<Proxy>> {
        CURRENT_PROXY
            .with(|current| current.borrow().clone())
            .ok_or(EngineError::NoCurrentProxy)
    }

    /// The innermost invocation published by [`ExposeInvocationInterceptor`]
    pub fn current_invocation() -> Result<InvocationSnapshot> {
        current_invocation()
    }

    /// Bind `proxy` until the returned guard drops; the previous value is
    /// restored then, so nested calls through other proxies unwind cleanly.
    pub(crate) fn expose(proxy: Arc<Proxy>) -> ProxyExposure {
        let previous = CURRENT_PROXY.with(|current| current.borrow_mut().replace(proxy));
        ProxyExposure {
            previous,
            _not_send: PhantomData,
        }
    }
}

/// Restores the previously exposed proxy on drop
pub struct ProxyExposure {
    previous: Option<Arc<Proxy>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ProxyExposure {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_PROXY.with(|current| *current.borrow_mut() = previous);
    }
}

/// What advice can learn about the current invocation from context
#[derive(Debug, Clone)]
pub struct InvocationSnapshot {
    pub method: Method,
    pub arguments: Vec<Value>,
    pub target_type: Option<Arc<TypeInfo>>,
    pub proxy: Option<Arc<Proxy>>,
}

/// The innermost invocation published on this thread
pub fn current_invocation() -> Result<InvocationSnapshot> {
    CURRENT_INVOCATIONS
        .with(|stack| stack.borrow().last().cloned())
        .ok_or(EngineError::NoCurrentInvocation)
}

static EXPOSE_INVOCATION_ADVISOR: Lazy<Advisor> = Lazy::new(|| {
    Advisor::unconditional(Advice::interceptor(ExposeInvocationInterceptor))
        .with_order(HIGHEST_PRECEDENCE)
        .with_name("expose-invocation")
});

/// Publishes the invocation for the rest of the chain
pub struct ExposeInvocationInterceptor;

impl ExposeInvocationInterceptor {
    /// Shared advisor; must sit first in any chain that needs it
    pub fn advisor() -> Advisor {
        EXPOSE_INVOCATION_ADVISOR.clone()
    }

    /// Whether `advisor` is the shared expose-invocation advisor
    pub fn is_advisor(advisor: &Advisor) -> bool {
        advisor.ptr_eq(&EXPOSE_INVOCATION_ADVISOR)
    }
}

struct SnapshotGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for SnapshotGuard {
    fn drop(&mut self) {
        CURRENT_INVOCATIONS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

impl MethodInterceptor for ExposeInvocationInterceptor {
    fn invoke(&self, invocation: &mut Invocation) -> anyhow::Result<Value> {
        let snapshot = InvocationSnapshot {
            method: invocation.method().clone(),
            arguments: invocation.arguments().to_vec(),
            target_type: invocation.target_type().cloned(),
            proxy: invocation.proxy().cloned(),
        };
        CURRENT_INVOCATIONS.with(|stack| stack.borrow_mut().push(snapshot));
        let _guard = SnapshotGuard {
            _not_send: PhantomData,
        };
        invocation.proceed()
    }
}
