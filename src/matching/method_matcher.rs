// src/matching/method_matcher.rs
//! Method matchers: predicates over a candidate method
//!
//! A matcher is either static (decided once per method and cached) or
//! runtime (`is_runtime() == true`), in which case the chain engine also
//! consults `matches_args` on every call.

use crate::matching::class_filter::ClassFilter;
use crate::meta::{Method, TypeInfo};
use crate::target::Value;
use std::fmt;
use std::sync::Arc;

pub trait MethodMatcher: Send + Sync + fmt::Debug {
    /// Static check. `target_type` is `None` when no target type is known.
    fn matches(&self, method: &Method, target_type: Option<&TypeInfo>) -> bool;

    /// Static check aware of capabilities introduced on top of the target.
    /// Callers that cannot tell pass `has_introductions = true`.
    fn matches_with_introductions(
        &self,
        method: &Method,
        target_type: Option<&TypeInfo>,
        _has_introductions: bool,
    ) -> bool {
        self.matches(method, target_type)
    }

    /// Whether `matches_args` must be evaluated per call
    fn is_runtime(&self) -> bool {
        false
    }

    /// Per-call check, only consulted after a positive static match on a
    /// runtime matcher
    fn matches_args(&self, _method: &Method, _target_type: Option<&TypeInfo>, _args: &[Value]) -> bool {
        true
    }
}

/// Matches every method
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMethod;

impl MethodMatcher for AnyMethod {
    fn matches(&self, _method: &Method, _target_type: Option<&TypeInfo>) -> bool {
        true
    }
}

/// Matches no method
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMethod;

impl MethodMatcher for NoMethod {
    fn matches(&self, _method: &Method, _target_type: Option<&TypeInfo>) -> bool {
        false
    }
}

/// Matches method names against `*` wildcard patterns
#[derive(Debug, Clone)]
pub struct NameMatchMethodMatcher {
    patterns: Vec<String>,
}

impl NameMatchMethodMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

impl MethodMatcher for NameMatchMethodMatcher {
    fn matches(&self, method: &Method, _target_type: Option<&TypeInfo>) -> bool {
        self.patterns
            .iter()
            .any(|p| super::simple_match(p, method.name()))
    }
}

/// Matches methods carrying an attribute, or one with `attribute:` prefix
#[derive(Debug, Clone)]
pub struct AttributeMethodMatcher {
    attribute: String,
}

impl AttributeMethodMatcher {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }
}

impl MethodMatcher for AttributeMethodMatcher {
    fn matches(&self, method: &Method, _target_type: Option<&TypeInfo>) -> bool {
        method.attributes().iter().any(|a| {
            a.as_ref() == self.attribute
                || a
                    .strip_prefix(self.attribute.as_str())
                    .map_or(false, |rest| rest.starts_with(':'))
        })
    }
}

/// Matches methods declared by a capability (or one extending it).
///
/// Introduction-aware: when capabilities were introduced on top of the
/// target, a method declared on the target type itself may still be served
/// through the introduced capability, so such methods also match.
#[derive(Debug, Clone)]
pub struct DeclaringCapabilityMatcher {
    capability: String,
}

impl DeclaringCapabilityMatcher {
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }
}

impl MethodMatcher for DeclaringCapabilityMatcher {
    fn matches(&self, method: &Method, target_type: Option<&TypeInfo>) -> bool {
        self.matches_with_introductions(method, target_type, true)
    }

    fn matches_with_introductions(
        &self,
        method: &Method,
        target_type: Option<&TypeInfo>,
        has_introductions: bool,
    ) -> bool {
        if method.declaring_type() == self.capability {
            return true;
        }
        match target_type {
            Some(ty) => {
                let declared_by_extension = ty
                    .all_capabilities()
                    .iter()
                    .any(|c| c.name() == method.declaring_type() && c.is_or_extends(&self.capability));
                let declared_on_type = method.declaring_type() == ty.name();
                declared_by_extension || (has_introductions && declared_on_type)
            }
            None => has_introductions,
        }
    }
}

type StaticPredicate = Arc<dyn Fn(&Method, Option<&TypeInfo>) -> bool + Send + Sync>;
type ArgsPredicate = Arc<dyn Fn(&Method, &[Value]) -> bool + Send + Sync>;

/// Runtime matcher built from closures: a static pre-check plus an
/// argument check re-evaluated on every call
#[derive(Clone)]
pub struct ArgumentMatcher {
    name: String,
    static_check: StaticPredicate,
    args_check: ArgsPredicate,
}

impl ArgumentMatcher {
    pub fn new<S, A>(name: impl Into<String>, static_check: S, args_check: A) -> Self
    where
        S: Fn(&Method, Option<&TypeInfo>) -> bool + Send + Sync + 'static,
        A: Fn(&Method, &[Value]) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            static_check: Arc::new(static_check),
            args_check: Arc::new(args_check),
        }
    }
}

impl fmt::Debug for ArgumentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentMatcher").field("name", &self.name).finish()
    }
}

impl MethodMatcher for ArgumentMatcher {
    fn matches(&self, method: &Method, target_type: Option<&TypeInfo>) -> bool {
        (self.static_check)(method, target_type)
    }

    fn is_runtime(&self) -> bool {
        true
    }

    fn matches_args(&self, method: &Method, _target_type: Option<&TypeInfo>, args: &[Value]) -> bool {
        (self.args_check)(method, args)
    }
}

/// Matches when any member matches
#[derive(Debug, Clone)]
pub struct UnionMethodMatcher {
    matchers: Vec<Arc<dyn MethodMatcher>>,
}

impl MethodMatcher for UnionMethodMatcher {
    fn matches(&self, method: &Method, target_type: Option<&TypeInfo>) -> bool {
        self.matchers.iter().any(|m| m.matches(method, target_type))
    }

    fn matches_with_introductions(
        &self,
        method: &Method,
        target_type: Option<&TypeInfo>,
        has_introductions: bool,
    ) -> bool {
        self.matchers
            .iter()
            .any(|m| m.matches_with_introductions(method, target_type, has_introductions))
    }

    fn is_runtime(&self) -> bool {
        self.matchers.iter().any(|m| m.is_runtime())
    }

    fn matches_args(&self, method: &Method, target_type: Option<&TypeInfo>, args: &[Value]) -> bool {
        self.matchers.iter().any(|m| {
            m.matches(method, target_type)
                && (!m.is_runtime() || m.matches_args(method, target_type, args))
        })
    }
}

/// Matches when every member matches
#[derive(Debug, Clone)]
pub struct IntersectionMethodMatcher {
    matchers: Vec<Arc<dyn MethodMatcher>>,
}

impl MethodMatcher for IntersectionMethodMatcher {
    fn matches(&self, method: &Method, target_type: Option<&TypeInfo>) -> bool {
        self.matchers.iter().all(|m| m.matches(method, target_type))
    }

    fn matches_with_introductions(
        &self,
        method: &Method,
        target_type: Option<&TypeInfo>,
        has_introductions: bool,
    ) -> bool {
        self.matchers
            .iter()
            .all(|m| m.matches_with_introductions(method, target_type, has_introductions))
    }

    fn is_runtime(&self) -> bool {
        self.matchers.iter().any(|m| m.is_runtime())
    }

    fn matches_args(&self, method: &Method, target_type: Option<&TypeInfo>, args: &[Value]) -> bool {
        self.matchers
            .iter()
            .all(|m| !m.is_runtime() || m.matches_args(method, target_type, args))
    }
}

/// Union of two pointcuts' matchers where each side only counts when its
/// own class filter accepts the target type
#[derive(Debug, Clone)]
pub struct ClassFilterAwareUnion {
    left: (Arc<dyn ClassFilter>, Arc<dyn MethodMatcher>),
    right: (Arc<dyn ClassFilter>, Arc<dyn MethodMatcher>),
}

impl ClassFilterAwareUnion {
    pub fn new(
        left: (Arc<dyn ClassFilter>, Arc<dyn MethodMatcher>),
        right: (Arc<dyn ClassFilter>, Arc<dyn MethodMatcher>),
    ) -> Self {
        Self { left, right }
    }

    fn side_applies(filter: &Arc<dyn ClassFilter>, target_type: Option<&TypeInfo>) -> bool {
        target_type.map_or(true, |ty| filter.matches(ty))
    }
}

impl MethodMatcher for ClassFilterAwareUnion {
    fn matches(&self, method: &Method, target_type: Option<&TypeInfo>) -> bool {
        self.matches_with_introductions(method, target_type, true)
    }

    fn matches_with_introductions(
        &self,
        method: &Method,
        target_type: Option<&TypeInfo>,
        has_introductions: bool,
    ) -> bool {
        [&self.left, &self.right].iter().any(|(filter, matcher)| {
            Self::side_applies(filter, target_type)
                && matcher.matches_with_introductions(method, target_type, has_introductions)
        })
    }

    fn is_runtime(&self) -> bool {
        self.left.1.is_runtime() || self.right.1.is_runtime()
    }

    fn matches_args(&self, method: &Method, target_type: Option<&TypeInfo>, args: &[Value]) -> bool {
        [&self.left, &self.right].iter().any(|(filter, matcher)| {
            Self::side_applies(filter, target_type)
                && matcher.matches(method, target_type)
                && (!matcher.is_runtime() || matcher.matches_args(method, target_type, args))
        })
    }
}

/// Inverts another matcher's static decision
#[derive(Debug, Clone)]
pub struct NegateMethodMatcher {
    inner: Arc<dyn MethodMatcher>,
}

impl MethodMatcher for NegateMethodMatcher {
    fn matches(&self, method: &Method, target_type: Option<&TypeInfo>) -> bool {
        !self.inner.matches(method, target_type)
    }

    fn matches_with_introductions(
        &self,
        method: &Method,
        target_type: Option<&TypeInfo>,
        has_introductions: bool,
    ) -> bool {
        !self
            .inner
            .matches_with_introductions(method, target_type, has_introductions)
    }
}

pub fn union(a: Arc<dyn MethodMatcher>, b: Arc<dyn MethodMatcher>) -> Arc<dyn MethodMatcher> {
    Arc::new(UnionMethodMatcher {
        matchers: vec![a, b],
    })
}

pub fn intersection(a: Arc<dyn MethodMatcher>, b: Arc<dyn MethodMatcher>) -> Arc<dyn MethodMatcher> {
    Arc::new(IntersectionMethodMatcher {
        matchers: vec![a, b],
    })
}

/// Negates the static decision only; the result is always a static matcher
pub fn negate(inner: Arc<dyn MethodMatcher>) -> Arc<dyn MethodMatcher> {
    Arc::new(NegateMethodMatcher { inner })
}
