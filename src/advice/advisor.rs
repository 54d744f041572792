// src/advice/advisor.rs
//! Advisor: advice plus the rule deciding where it applies

use crate::advice::{Advice, LOWEST_PRECEDENCE};
use crate::matching::{ClassFilter, Pointcut};
use crate::meta::{Capability, TypeInfo};
use std::fmt;
use std::sync::Arc;

/// Where an advisor applies
#[derive(Debug, Clone)]
pub enum AdvisorKind {
    /// Every call reaching the proxy
    Unconditional,

    /// Calls selected by the pointcut
    Pointcut(Pointcut),

    /// Adds capabilities to the proxy; selected by class filter only
    Introduction {
        class_filter: Arc<dyn ClassFilter>,
        capabilities: Vec<Arc<Capability>>,
    },
}

#[derive(Clone)]
struct AdvisorInner {
    name: Option<String>,
    advice: Advice,
    kind: AdvisorKind,
    order: i32,
    per_instance: bool,
    requires_invocation_context: bool,
}

/// An advice bound to a matching rule, with ordering metadata.
///
/// Cloning is cheap and preserves identity; `ptr_eq` compares identity.
#[derive(Clone)]
pub struct Advisor {
    inner: Arc<AdvisorInner>,
}

impl Advisor {
    fn from_parts(advice: Advice, kind: AdvisorKind) -> Self {
        Self {
            inner: Arc::new(AdvisorInner {
                name: None,
                advice,
                kind,
                order: LOWEST_PRECEDENCE,
                per_instance: true,
                requires_invocation_context: false,
            }),
        }
    }

    /// Applies to every call
    pub fn unconditional(advice: Advice) -> Self {
        Self::from_parts(advice, AdvisorKind::Unconditional)
    }

    /// Applies where `pointcut` matches
    pub fn new(advice: Advice, pointcut: Pointcut) -> Self {
        Self::from_parts(advice, AdvisorKind::Pointcut(pointcut))
    }

    /// Introduces `capabilities` on types accepted by `class_filter`
    pub fn introduction(
        advice: Advice,
        capabilities: Vec<Arc<Capability>>,
        class_filter: Arc<dyn ClassFilter>,
    ) -> Self {
        Self::from_parts(
            advice,
            AdvisorKind::Introduction {
                class_filter,
                capabilities,
            },
        )
    }

    pub fn with_order(mut self, order: i32) -> Self {
        Arc::make_mut(&mut self.inner).order = order;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).name = Some(name.into());
        self
    }

    pub fn with_per_instance(mut self, per_instance: bool) -> Self {
        Arc::make_mut(&mut self.inner).per_instance = per_instance;
        self
    }

    /// Mark this advisor as reading the current invocation from context
    pub fn requiring_invocation_context(mut self) -> Self {
        Arc::make_mut(&mut self.inner).requires_invocation_context = true;
        self
    }

    pub fn advice(&self) -> &Advice {
        &self.inner.advice
    }

    pub fn kind(&self) -> &AdvisorKind {
        &self.inner.kind
    }

    pub fn pointcut(&self) -> Option<&Pointcut> {
        match &self.inner.kind {
            AdvisorKind::Pointcut(pointcut) => Some(pointcut),
            _ => None,
        }
    }

    pub fn is_introduction(&self) -> bool {
        matches!(self.inner.kind, AdvisorKind::Introduction { .. })
    }

    /// Capabilities added to the proxy by this advisor
    pub fn introduced_capabilities(&self) -> &[Arc<Capability>] {
        match &self.inner.kind {
            AdvisorKind::Introduction { capabilities, .. } => capabilities,
            _ => &[],
        }
    }

    pub fn order(&self) -> i32 {
        self.inner.order
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn is_per_instance(&self) -> bool {
        self.inner.per_instance
    }

    pub fn requires_invocation_context(&self) -> bool {
        self.inner.requires_invocation_context
    }

    pub fn ptr_eq(&self, other: &Advisor) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether this advisor can apply to some method of `target_type`
    pub fn can_apply(&self, target_type: &TypeInfo, has_introductions: bool) -> bool {
        match &self.inner.kind {
            AdvisorKind::Unconditional => true,
            AdvisorKind::Pointcut(pointcut) => pointcut.can_apply(target_type, has_introductions),
            AdvisorKind::Introduction { class_filter, .. } => class_filter.matches(target_type),
        }
    }
}

impl fmt::Debug for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advisor")
            .field("name", &self.inner.name)
            .field("advice", &self.inner.advice)
            .field("kind", &self.inner.kind)
            .field("order", &self.inner.order)
            .finish()
    }
}

impl fmt::Display for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "advisor[{}]", self.inner.advice.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::Invocation;
    use crate::matching::AnyClass;

    fn passthrough() -> Advice {
        Advice::interceptor(|inv: &mut Invocation| inv.proceed())
    }

    #[test]
    fn test_defaults() {
        let advisor = Advisor::unconditional(passthrough());
        assert_eq!(advisor.order(), LOWEST_PRECEDENCE);
        assert!(advisor.is_per_instance());
        assert!(advisor.pointcut().is_none());
        assert!(!advisor.is_introduction());
        assert!(!advisor.requires_invocation_context());
    }

    #[test]
    fn test_builder_settings() {
        let advisor = Advisor::new(passthrough(), Pointcut::name_match(["get*"]))
            .with_order(5)
            .with_name("getters")
            .with_per_instance(false)
            .requiring_invocation_context();
        assert_eq!(advisor.order(), 5);
        assert_eq!(advisor.name(), Some("getters"));
        assert!(!advisor.is_per_instance());
        assert!(advisor.requires_invocation_context());
        assert!(advisor.pointcut().is_some());
        assert_eq!(advisor.to_string(), "getters");
    }

    #[test]
    fn test_identity() {
        let a = Advisor::unconditional(passthrough());
        let b = a.clone();
        let c = Advisor::unconditional(a.advice().clone());
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert!(a.advice().ptr_eq(c.advice()));
    }

    #[test]
    fn test_introduction_can_apply_by_class_filter() {
        let lockable = Capability::builder("Lockable").method("lock").build();
        let advisor = Advisor::introduction(passthrough(), vec![lockable], Arc::new(AnyClass));
        let ty = TypeInfo::builder("Plain").build();
        assert!(advisor.is_introduction());
        assert_eq!(advisor.introduced_capabilities().len(), 1);
        assert!(advisor.can_apply(&ty, false));
    }
}
