// src/matching/class_filter.rs
//! Class filters: pure predicates over a target type

use crate::meta::TypeInfo;
use std::fmt;
use std::sync::Arc;

/// Structural predicate over a target's type.
///
/// Implementations must be pure functions of the type: the engine calls them
/// before any instance exists and caches the outcome per type.
pub trait ClassFilter: Send + Sync + fmt::Debug {
    fn matches(&self, target_type: &TypeInfo) -> bool;
}

/// Matches every type
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyClass;

impl ClassFilter for AnyClass {
    fn matches(&self, _target_type: &TypeInfo) -> bool {
        true
    }
}

/// Matches no type
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClass;

impl ClassFilter for NoClass {
    fn matches(&self, _target_type: &TypeInfo) -> bool {
        false
    }
}

/// Matches a type and everything inheriting from it
#[derive(Debug, Clone)]
pub struct RootTypeFilter {
    root: String,
}

impl RootTypeFilter {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

impl ClassFilter for RootTypeFilter {
    fn matches(&self, target_type: &TypeInfo) -> bool {
        target_type.is_subtype_of(&self.root)
    }
}

/// Matches types exposing a capability (directly or inherited)
#[derive(Debug, Clone)]
pub struct CapabilityFilter {
    capability: String,
}

impl CapabilityFilter {
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }
}

impl ClassFilter for CapabilityFilter {
    fn matches(&self, target_type: &TypeInfo) -> bool {
        target_type.implements(&self.capability)
    }
}

/// Matches type names against `*` wildcard patterns
#[derive(Debug, Clone)]
pub struct TypeNameFilter {
    patterns: Vec<String>,
}

impl TypeNameFilter {
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

impl ClassFilter for TypeNameFilter {
    fn matches(&self, target_type: &TypeInfo) -> bool {
        self.patterns
            .iter()
            .any(|p| super::simple_match(p, target_type.name()))
    }
}

/// Matches when any member matches
#[derive(Debug, Clone)]
pub struct UnionClassFilter {
    filters: Vec<Arc<dyn ClassFilter>>,
}

impl ClassFilter for UnionClassFilter {
    fn matches(&self, target_type: &TypeInfo) -> bool {
        self.filters.iter().any(|f| f.matches(target_type))
    }
}

/// Matches when every member matches
#[derive(Debug, Clone)]
pub struct IntersectionClassFilter {
    filters: Vec<Arc<dyn ClassFilter>>,
}

impl ClassFilter for IntersectionClassFilter {
    fn matches(&self, target_type: &TypeInfo) -> bool {
        self.filters.iter().all(|f| f.matches(target_type))
    }
}

/// Inverts another filter
#[derive(Debug, Clone)]
pub struct NegateClassFilter {
    inner: Arc<dyn ClassFilter>,
}

impl ClassFilter for NegateClassFilter {
    fn matches(&self, target_type: &TypeInfo) -> bool {
        !self.inner.matches(target_type)
    }
}

pub fn union(a: Arc<dyn ClassFilter>, b: Arc<dyn ClassFilter>) -> Arc<dyn ClassFilter> {
    Arc::new(UnionClassFilter {
        filters: vec![a, b],
    })
}

pub fn intersection(a: Arc<dyn ClassFilter>, b: Arc<dyn ClassFilter>) -> Arc<dyn ClassFilter> {
    Arc::new(IntersectionClassFilter {
        filters: vec![a, b],
    })
}

pub fn negate(inner: Arc<dyn ClassFilter>) -> Arc<dyn ClassFilter> {
    Arc::new(NegateClassFilter { inner })
}
