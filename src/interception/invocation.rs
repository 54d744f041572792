// src/interception/invocation.rs
//! Per-call invocation and the `proceed()` protocol

use crate::matching::MethodMatcher;
use crate::meta::{Method, TypeInfo};
use crate::proxy::Proxy;
use crate::target::{Target, TargetSource, Value};
use crate::utils::errors::EngineError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Around advice: the only shape the chain engine runs
pub trait MethodInterceptor: Send + Sync {
    /// Handle the call. Calling `invocation.proceed()` runs the rest of the
    /// chain and the target; not calling it short-circuits both.
    fn invoke(&self, invocation: &mut Invocation) -> anyhow::Result<Value>;
}

impl<F> MethodInterceptor for F
where
    F: Fn(&mut Invocation) -> anyhow::Result<Value> + Send + Sync,
{
    fn invoke(&self, invocation: &mut Invocation) -> anyhow::Result<Value> {
        self(invocation)
    }
}

/// Interceptor from a closure
pub fn interceptor_fn<F>(f: F) -> Arc<dyn MethodInterceptor>
where
    F: Fn(&mut Invocation) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One resolved step of a chain
#[derive(Clone)]
pub enum ChainElement {
    /// Always runs
    Static(Arc<dyn MethodInterceptor>),

    /// Runs only when `matcher` accepts the actual arguments
    Runtime {
        interceptor: Arc<dyn MethodInterceptor>,
        matcher: Arc<dyn MethodMatcher>,
    },
}

impl ChainElement {
    pub fn interceptor(&self) -> &Arc<dyn MethodInterceptor> {
        match self {
            ChainElement::Static(interceptor) => interceptor,
            ChainElement::Runtime { interceptor, .. } => interceptor,
        }
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, ChainElement::Runtime { .. })
    }
}

impl fmt::Debug for ChainElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainElement::Static(_) => write!(f, "Static"),
            ChainElement::Runtime { matcher, .. } => write!(f, "Runtime({:?})", matcher),
        }
    }
}

/// Context of a single proxied call. Created per call, never shared.
pub struct Invocation {
    proxy: Option<Arc<Proxy>>,
    target_source: Arc<dyn TargetSource>,
    target: Option<Arc<dyn Target>>,
    target_type: Option<Arc<TypeInfo>>,
    method: Method,
    args: Vec<Value>,
    chain: Arc<[ChainElement]>,
    index: usize,
    attributes: HashMap<String, Value>,
}

impl Invocation {
    /// Prepare a call. A static source's target is fetched now; any other
    /// source is only consulted when the chain reaches the target.
    pub fn new(
        target_source: Arc<dyn TargetSource>,
        method: Method,
        args: Vec<Value>,
        chain: Arc<[ChainElement]>,
    ) -> anyhow::Result<Self> {
        let target = if target_source.is_static() {
            target_source.get_target()?
        } else {
            None
        };
        let target_type = target
            .as_ref()
            .map(|t| t.type_info())
            .or_else(|| target_source.target_type());

        Ok(Self {
            proxy: None,
            target_source,
            target,
            target_type,
            method,
            args,
            chain,
            index: 0,
            attributes: HashMap::new(),
        })
    }

    pub(crate) fn with_proxy(mut self, proxy: Option<Arc<Proxy>>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn arguments(&self) -> &[Value] {
        &self.args
    }

    /// Interceptors may rewrite arguments before proceeding
    pub fn arguments_mut(&mut self) -> &mut Vec<Value> {
        &mut self.args
    }

    /// The target, when one is bound up front (static sources only)
    pub fn this(&self) -> Option<&Arc<dyn Target>> {
        self.target.as_ref()
    }

    /// The proxy this call came through
    pub fn proxy(&self) -> Option<&Arc<Proxy>> {
        self.proxy.as_ref()
    }

    pub fn target_type(&self) -> Option<&Arc<TypeInfo>> {
        self.target_type.as_ref()
    }

    /// Per-call scratch space shared by the interceptors of this call
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Run the next interceptor, or the target at the end of the chain.
    ///
    /// Each call starts from the caller's position, so an interceptor that
    /// proceeds twice runs everything after it twice.
    pub fn proceed(&mut self) -> anyhow::Result<Value> {
        let start = self.index;
        let result = self.proceed_from(start);
        self.index = start;
        result
    }

    fn proceed_from(&mut self, mut position: usize) -> anyhow::Result<Value> {
        let chain = Arc::clone(&self.chain);
        while let Some(element) = chain.get(position) {
            position += 1;
            match element {
                ChainElement::Static(interceptor) => {
                    self.index = position;
                    return interceptor.invoke(self);
                }
                ChainElement::Runtime {
                    interceptor,
                    matcher,
                } => {
                    if matcher.matches_args(&self.method, self.target_type.as_deref(), &self.args) {
                        self.index = position;
                        return interceptor.invoke(self);
                    }
                    trace!(method = %self.method, "Runtime matcher skipped interceptor");
                }
            }
        }
        self.index = position;
        self.invoke_joinpoint()
    }

    fn invoke_joinpoint(&self) -> anyhow::Result<Value> {
        if self.target_source.is_static() {
            let target = self
                .target
                .as_ref()
                .ok_or_else(|| EngineError::NoTarget(self.method.to_string()))?;
            return target.invoke(&self.method, &self.args);
        }

        let target = self
            .target_source
            .get_target()?
            .ok_or_else(|| EngineError::NoTarget(self.method.to_string()))?;
        let mut lease = TargetLease {
            source: self.target_source.as_ref(),
            target: Some(target),
        };
        let result = match lease.target.as_ref() {
            Some(target) => target.invoke(&self.method, &self.args),
            None => Err(EngineError::NoTarget(self.method.to_string()).into()),
        };
        let released = lease.release();

        match (result, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release_err)) => Err(release_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => {
                warn!(
                    method = %self.method,
                    error = %release_err,
                    "Target release failed after call error"
                );
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("method", &self.method.to_string())
            .field("args", &self.args)
            .field("position", &self.index)
            .field("chain_len", &self.chain.len())
            .finish()
    }
}

/// A target borrowed from a non-static source; returned on drop if the
/// normal release path was not reached.
struct TargetLease<'a> {
    source: &'a dyn TargetSource,
    target: Option<Arc<dyn Target>>,
}

impl TargetLease<'_> {
    fn release(&mut self) -> anyhow::Result<()> {
        match self.target.take() {
            Some(target) => self.source.release_target(target),
            None => Ok(()),
        }
    }
}

impl Drop for TargetLease<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "Target release failed during unwind");
        }
    }
}
