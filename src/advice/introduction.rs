// src/advice/introduction.rs
//! Introductions: capabilities the proxy gains without the target having them

use crate::advice::{Advice, Advisor};
use crate::interception::{Invocation, MethodInterceptor};
use crate::matching::{AnyClass, ClassFilter};
use crate::meta::Capability;
use crate::target::{Target, Value};
use std::sync::Arc;

/// Answers calls on the introduced capabilities from a delegate object and
/// lets every other call proceed to the target.
pub struct DelegatingIntroductionInterceptor {
    delegate: Arc<dyn Target>,
    capabilities: Vec<Arc<Capability>>,
}

impl DelegatingIntroductionInterceptor {
    pub fn new(delegate: Arc<dyn Target>, capabilities: Vec<Arc<Capability>>) -> Self {
        Self {
            delegate,
            capabilities,
        }
    }

    /// Whether `capability` is one of (or a parent of) the introduced set
    pub fn implements(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c.is_or_extends(capability))
    }

    /// Introduction advisor applying to every type
    pub fn into_advisor(self) -> Advisor {
        self.into_advisor_for(Arc::new(AnyClass))
    }

    /// Introduction advisor restricted by `class_filter`
    pub fn into_advisor_for(self, class_filter: Arc<dyn ClassFilter>) -> Advisor {
        let capabilities = self.capabilities.clone();
        Advisor::introduction(Advice::interceptor(self), capabilities, class_filter)
    }
}

impl MethodInterceptor for DelegatingIntroductionInterceptor {
    fn invoke(&self, invocation: &mut Invocation) -> anyhow::Result<Value> {
        if self.implements(invocation.method().declaring_type()) {
            return self.delegate.invoke(invocation.method(), invocation.arguments());
        }
        invocation.proceed()
    }
}
