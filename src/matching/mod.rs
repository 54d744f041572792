// src/matching/mod.rs
//! Matching model
//!
//! - **class_filter**: Predicates over target types
//! - **method_matcher**: Static and runtime predicates over methods
//! - **pointcut**: Class filter + method matcher, with union/intersection

pub mod class_filter;
pub mod method_matcher;
pub mod pointcut;

pub use class_filter::{AnyClass, CapabilityFilter, ClassFilter, NoClass, RootTypeFilter, TypeNameFilter};
pub use method_matcher::{
    AnyMethod, ArgumentMatcher, AttributeMethodMatcher, DeclaringCapabilityMatcher, MethodMatcher,
    NameMatchMethodMatcher, NoMethod,
};
pub use pointcut::Pointcut;

/// `*` wildcard match: `"find*"`, `"*Service"`, `"*order*"`, `"a*b*c"`
pub fn simple_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || text.len() < first.len() + last.len() || !text.ends_with(last) {
        return false;
    }

    let mut remaining = &text[first.len()..text.len() - last.len()];
    for middle in &parts[1..parts.len() - 1] {
        match remaining.find(middle) {
            Some(pos) => remaining = &remaining[pos + middle.len()..],
            None => return false,
        }
    }
    true
}
