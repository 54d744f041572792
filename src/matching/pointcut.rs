// src/matching/pointcut.rs
//! Pointcut: a class filter paired with a method matcher

use crate::matching::class_filter::{self, AnyClass, CapabilityFilter, ClassFilter, NoClass};
use crate::matching::method_matcher::{
    self, AnyMethod, AttributeMethodMatcher, ClassFilterAwareUnion, DeclaringCapabilityMatcher,
    MethodMatcher, NameMatchMethodMatcher, NoMethod,
};
use crate::meta::{Method, TypeInfo};
use crate::target::Value;
use std::sync::Arc;

/// Selects the types and methods an advisor applies to
#[derive(Debug, Clone)]
pub struct Pointcut {
    class_filter: Arc<dyn ClassFilter>,
    method_matcher: Arc<dyn MethodMatcher>,
}

impl Pointcut {
    pub fn new(class_filter: Arc<dyn ClassFilter>, method_matcher: Arc<dyn MethodMatcher>) -> Self {
        Self {
            class_filter,
            method_matcher,
        }
    }

    /// Matches every method of every type
    pub fn all() -> Self {
        Self::new(Arc::new(AnyClass), Arc::new(AnyMethod))
    }

    /// Matches nothing
    pub fn none() -> Self {
        Self::new(Arc::new(NoClass), Arc::new(NoMethod))
    }

    /// Restrict by type only
    pub fn for_class_filter(class_filter: Arc<dyn ClassFilter>) -> Self {
        Self::new(class_filter, Arc::new(AnyMethod))
    }

    /// Restrict by method only
    pub fn for_method_matcher(method_matcher: Arc<dyn MethodMatcher>) -> Self {
        Self::new(Arc::new(AnyClass), method_matcher)
    }

    /// Methods whose names match any `*` wildcard pattern
    pub fn name_match<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::for_method_matcher(Arc::new(NameMatchMethodMatcher::new(patterns)))
    }

    /// Methods carrying `attribute`
    pub fn attribute(attribute: impl Into<String>) -> Self {
        Self::for_method_matcher(Arc::new(AttributeMethodMatcher::new(attribute)))
    }

    /// Methods of `capability` (or a capability extending it) on types
    /// exposing it
    pub fn capability(capability: impl Into<String>) -> Self {
        let capability = capability.into();
        Self::new(
            Arc::new(CapabilityFilter::new(capability.clone())),
            Arc::new(DeclaringCapabilityMatcher::new(capability)),
        )
    }

    pub fn class_filter(&self) -> &Arc<dyn ClassFilter> {
        &self.class_filter
    }

    pub fn method_matcher(&self) -> &Arc<dyn MethodMatcher> {
        &self.method_matcher
    }

    /// Matches where either pointcut matches. Each side's method matcher only
    /// counts for types its own class filter accepts.
    pub fn union(&self, other: &Pointcut) -> Pointcut {
        Pointcut {
            class_filter: class_filter::union(
                Arc::clone(&self.class_filter),
                Arc::clone(&other.class_filter),
            ),
            method_matcher: Arc::new(ClassFilterAwareUnion::new(
                (Arc::clone(&self.class_filter), Arc::clone(&self.method_matcher)),
                (Arc::clone(&other.class_filter), Arc::clone(&other.method_matcher)),
            )),
        }
    }

    /// Matches where both pointcuts match
    pub fn intersection(&self, other: &Pointcut) -> Pointcut {
        Pointcut {
            class_filter: class_filter::intersection(
                Arc::clone(&self.class_filter),
                Arc::clone(&other.class_filter),
            ),
            method_matcher: method_matcher::intersection(
                Arc::clone(&self.method_matcher),
                Arc::clone(&other.method_matcher),
            ),
        }
    }

    /// Full check for one concrete call, including runtime matchers
    pub fn matches_call(&self, method: &Method, target_type: Option<&TypeInfo>, args: &[Value]) -> bool {
        if let Some(ty) = target_type {
            if !self.class_filter.matches(ty) {
                return false;
            }
        }
        self.method_matcher.matches(method, target_type)
            && (!self.method_matcher.is_runtime()
                || self.method_matcher.matches_args(method, target_type, args))
    }

    /// Whether this pointcut can apply to any method of `target_type`
    pub fn can_apply(&self, target_type: &TypeInfo, has_introductions: bool) -> bool {
        if !self.class_filter.matches(target_type) {
            return false;
        }
        target_type.all_methods().iter().any(|m| {
            self.method_matcher
                .matches_with_introductions(m, Some(target_type), has_introductions)
        })
    }
}

impl Default for Pointcut {
    fn default() -> Self {
        Self::all()
    }
}
