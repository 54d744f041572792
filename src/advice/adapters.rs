// src/advice/adapters.rs
//! Advisor adapters and the adapter registry
//!
//! Every advice shape the engine understands is turned into a
//! [`MethodInterceptor`] here. Around advice passes through unchanged; the
//! before / after-returning / throws shapes are wrapped by their adapter.
//! Custom shapes can be supported by registering another adapter.

use crate::advice::{AfterReturningAdvice, Advice, Advisor, MethodBeforeAdvice, ThrowsAdvice};
use crate::interception::{Invocation, MethodInterceptor};
use crate::target::Value;
use crate::utils::errors::{EngineError, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Converts one advice shape into an interceptor
pub trait AdvisorAdapter: Send + Sync {
    fn supports_advice(&self, advice: &Advice) -> bool;

    fn interceptor(&self, advisor: &Advisor) -> Result<Arc<dyn MethodInterceptor>>;
}

fn unsupported(advice: &Advice) -> EngineError {
    EngineError::UnknownAdviceType(advice.kind().to_string())
}

/// Runs the before advice, then proceeds
struct MethodBeforeAdviceInterceptor {
    advice: Arc<dyn MethodBeforeAdvice>,
}

impl MethodInterceptor for MethodBeforeAdviceInterceptor {
    fn invoke(&self, invocation: &mut Invocation) -> anyhow::Result<Value> {
        self.advice
            .before(invocation.method(), invocation.arguments(), invocation.this())?;
        invocation.proceed()
    }
}

/// Proceeds, then reports a successful return
struct AfterReturningAdviceInterceptor {
    advice: Arc<dyn AfterReturningAdvice>,
}

impl MethodInterceptor for AfterReturningAdviceInterceptor {
    fn invoke(&self, invocation: &mut Invocation) -> anyhow::Result<Value> {
        let value = invocation.proceed()?;
        self.advice.after_returning(
            &value,
            invocation.method(),
            invocation.arguments(),
            invocation.this(),
        )?;
        Ok(value)
    }
}

/// Proceeds, reporting any error before rethrowing it
struct ThrowsAdviceInterceptor {
    advice: Arc<dyn ThrowsAdvice>,
}

impl MethodInterceptor for ThrowsAdviceInterceptor {
    fn invoke(&self, invocation: &mut Invocation) -> anyhow::Result<Value> {
        match invocation.proceed() {
            Ok(value) => Ok(value),
            Err(err) => {
                self.advice.after_throwing(
                    &err,
                    invocation.method(),
                    invocation.arguments(),
                    invocation.this(),
                )?;
                Err(err)
            }
        }
    }
}

pub struct BeforeAdviceAdapter;

impl AdvisorAdapter for BeforeAdviceAdapter {
    fn supports_advice(&self, advice: &Advice) -> bool {
        advice.downcast_ref::<Arc<dyn MethodBeforeAdvice>>().is_some()
    }

    fn interceptor(&self, advisor: &Advisor) -> Result<Arc<dyn MethodInterceptor>> {
        let advice = advisor
            .advice()
            .downcast_ref::<Arc<dyn MethodBeforeAdvice>>()
            .ok_or_else(|| unsupported(advisor.advice()))?;
        Ok(Arc::new(MethodBeforeAdviceInterceptor {
            advice: Arc::clone(advice),
        }))
    }
}

pub struct AfterReturningAdviceAdapter;

impl AdvisorAdapter for AfterReturningAdviceAdapter {
    fn supports_advice(&self, advice: &Advice) -> bool {
        advice.downcast_ref::<Arc<dyn AfterReturningAdvice>>().is_some()
    }

    fn interceptor(&self, advisor: &Advisor) -> Result<Arc<dyn MethodInterceptor>> {
        let advice = advisor
            .advice()
            .downcast_ref::<Arc<dyn AfterReturningAdvice>>()
            .ok_or_else(|| unsupported(advisor.advice()))?;
        Ok(Arc::new(AfterReturningAdviceInterceptor {
            advice: Arc::clone(advice),
        }))
    }
}

pub struct ThrowsAdviceAdapter;

impl AdvisorAdapter for ThrowsAdviceAdapter {
    fn supports_advice(&self, advice: &Advice) -> bool {
        advice.downcast_ref::<Arc<dyn ThrowsAdvice>>().is_some()
    }

    fn interceptor(&self, advisor: &Advisor) -> Result<Arc<dyn MethodInterceptor>> {
        let advice = advisor
            .advice()
            .downcast_ref::<Arc<dyn ThrowsAdvice>>()
            .ok_or_else(|| unsupported(advisor.advice()))?;
        Ok(Arc::new(ThrowsAdviceInterceptor {
            advice: Arc::clone(advice),
        }))
    }
}

static GLOBAL_REGISTRY: Lazy<Arc<AdapterRegistry>> = Lazy::new(|| Arc::new(AdapterRegistry::new()));

/// Ordered set of adapters
pub struct AdapterRegistry {
    adapters: RwLock<Vec<Arc<dyn AdvisorAdapter>>>,
}

impl AdapterRegistry {
    /// Registry with the before / after-returning / throws adapters
    pub fn new() -> Self {
        let adapters: Vec<Arc<dyn AdvisorAdapter>> = vec![
            Arc::new(BeforeAdviceAdapter),
            Arc::new(AfterReturningAdviceAdapter),
            Arc::new(ThrowsAdviceAdapter),
        ];
        Self {
            adapters: RwLock::new(adapters),
        }
    }

    /// Registry that only understands around advice
    pub fn empty() -> Self {
        Self {
            adapters: RwLock::new(Vec::new()),
        }
    }

    /// Process-wide default registry
    pub fn global() -> Arc<AdapterRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    pub fn register(&self, adapter: Arc<dyn AdvisorAdapter>) {
        self.adapters.write().push(adapter);
        debug!(adapters = self.adapters.read().len(), "Registered advisor adapter");
    }

    /// Whether some adapter (or the around-advice passthrough) accepts `advice`
    pub fn supports(&self, advice: &Advice) -> bool {
        advice.as_interceptor().is_some()
            || self.adapters.read().iter().any(|a| a.supports_advice(advice))
    }

    /// Wrap bare advice in an unconditional advisor
    pub fn wrap(&self, advice: Advice) -> Result<Advisor> {
        if !self.supports(&advice) {
            return Err(unsupported(&advice));
        }
        Ok(Advisor::unconditional(advice))
    }

    /// Interceptors for one advisor, in adapter order
    pub fn interceptors(&self, advisor: &Advisor) -> Result<Vec<Arc<dyn MethodInterceptor>>> {
        let mut interceptors = Vec::with_capacity(1);
        if let Some(interceptor) = advisor.advice().as_interceptor() {
            interceptors.push(interceptor);
        }
        for adapter in self.adapters.read().iter() {
            if adapter.supports_advice(advisor.advice()) {
                interceptors.push(adapter.interceptor(advisor)?);
            }
        }
        if interceptors.is_empty() {
            return Err(unsupported(advisor.advice()));
        }
        Ok(interceptors)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
