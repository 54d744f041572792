// src/advice/mod.rs
//! Advice and advisors
//!
//! [`Advice`] is an opaque handle: the engine never calls it directly. The
//! adapter registry turns every supported advice shape into a
//! [`MethodInterceptor`], so the chain engine only ever sees interceptors.
//!
//! - **advisor**: Advice bound to a pointcut (or unconditional) plus ordering
//! - **adapters**: Before / after-returning / throws adapters and the registry
//! - **introduction**: Interceptor answering calls on introduced capabilities

pub mod adapters;
pub mod advisor;
pub mod introduction;

use crate::interception::{Invocation, MethodInterceptor};
use crate::meta::Method;
use crate::target::{Target, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use adapters::{AdapterRegistry, AdvisorAdapter};
pub use advisor::{Advisor, AdvisorKind};
pub use introduction::DelegatingIntroductionInterceptor;

/// Order value that runs first
pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;

/// Order value that runs last (the default)
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// Runs before the call proceeds; an error aborts the call
pub trait MethodBeforeAdvice: Send + Sync {
    fn before(
        &self,
        method: &Method,
        args: &[Value],
        target: Option<&Arc<dyn Target>>,
    ) -> anyhow::Result<()>;
}

/// Observes a successful return value
pub trait AfterReturningAdvice: Send + Sync {
    fn after_returning(
        &self,
        return_value: &Value,
        method: &Method,
        args: &[Value],
        target: Option<&Arc<dyn Target>>,
    ) -> anyhow::Result<()>;
}

/// Observes an error leaving the call. The original error is rethrown
/// unless the handler itself fails, in which case its error wins.
pub trait ThrowsAdvice: Send + Sync {
    fn after_throwing(
        &self,
        error: &anyhow::Error,
        method: &Method,
        args: &[Value],
        target: Option<&Arc<dyn Target>>,
    ) -> anyhow::Result<()>;
}

/// Opaque unit of cross-cutting behavior
#[derive(Clone)]
pub struct Advice {
    inner: Arc<dyn Any + Send + Sync>,
    kind: &'static str,
}

impl Advice {
    /// Wrap any value; an adapter must recognize its type for it to be usable
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            kind: std::any::type_name::<T>(),
        }
    }

    /// Around advice
    pub fn interceptor<I: MethodInterceptor + 'static>(interceptor: I) -> Self {
        Self::from_interceptor(Arc::new(interceptor))
    }

    /// Around advice from a closure
    pub fn around<F>(f: F) -> Self
    where
        F: Fn(&mut Invocation) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::from_interceptor(Arc::new(f))
    }

    pub fn from_interceptor(interceptor: Arc<dyn MethodInterceptor>) -> Self {
        Self::new(interceptor)
    }

    pub fn before<B: MethodBeforeAdvice + 'static>(advice: B) -> Self {
        Self::new(Arc::new(advice) as Arc<dyn MethodBeforeAdvice>)
    }

    pub fn after_returning<A: AfterReturningAdvice + 'static>(advice: A) -> Self {
        Self::new(Arc::new(advice) as Arc<dyn AfterReturningAdvice>)
    }

    pub fn throws<T: ThrowsAdvice + 'static>(advice: T) -> Self {
        Self::new(Arc::new(advice) as Arc<dyn ThrowsAdvice>)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// The interceptor, when this advice is around advice
    pub fn as_interceptor(&self) -> Option<Arc<dyn MethodInterceptor>> {
        self.downcast_ref::<Arc<dyn MethodInterceptor>>().cloned()
    }

    /// Type name of the wrapped value
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Advice) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner) as *const (),
            Arc::as_ptr(&other.inner) as *const (),
        )
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advice").field("kind", &self.kind).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl MethodBeforeAdvice for Noop {
        fn before(&self, _: &Method, _: &[Value], _: Option<&Arc<dyn Target>>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_advice_identity() {
        let a = Advice::before(Noop);
        let b = a.clone();
        let c = Advice::before(Noop);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn test_advice_shapes() {
        let around = Advice::around(|inv| inv.proceed());
        assert!(around.as_interceptor().is_some());

        let before = Advice::before(Noop);
        assert!(before.as_interceptor().is_none());
        assert!(before.downcast_ref::<Arc<dyn MethodBeforeAdvice>>().is_some());

        let opaque = Advice::new(42_u32);
        assert_eq!(opaque.kind(), "u32");
        assert_eq!(opaque.downcast_ref::<u32>(), Some(&42));
    }
}
