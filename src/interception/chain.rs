// src/interception/chain.rs
//! Resolving the interceptor chain for one method

use crate::advice::{Advisor, AdvisorKind};
use crate::interception::{ChainElement, MethodInterceptor};
use crate::meta::{Method, TypeInfo};
use std::sync::Arc;

/// An advisor registered on a proxy configuration, with its interceptors
/// already produced by the adapter registry.
#[derive(Clone)]
pub struct ResolvedAdvisor {
    pub advisor: Advisor,
    pub interceptors: Vec<Arc<dyn MethodInterceptor>>,
}

/// Builds the ordered chain applying to one method
pub trait AdvisorChainFactory: Send + Sync {
    fn chain(
        &self,
        advisors: &[ResolvedAdvisor],
        method: &Method,
        target_type: Option<&TypeInfo>,
        pre_filtered: bool,
    ) -> Vec<ChainElement>;
}

/// Declaration-order filtering of the configured advisors.
///
/// A missing target type is treated as a class-filter match.
#[derive(Debug, Default)]
pub struct DefaultAdvisorChainFactory;

impl DefaultAdvisorChainFactory {
    fn has_matching_introductions(advisors: &[ResolvedAdvisor], target_type: Option<&TypeInfo>) -> bool {
        advisors.iter().any(|resolved| match resolved.advisor.kind() {
            AdvisorKind::Introduction { class_filter, .. } => {
                target_type.map_or(true, |ty| class_filter.matches(ty))
            }
            _ => false,
        })
    }
}

impl AdvisorChainFactory for DefaultAdvisorChainFactory {
    fn chain(
        &self,
        advisors: &[ResolvedAdvisor],
        method: &Method,
        target_type: Option<&TypeInfo>,
        pre_filtered: bool,
    ) -> Vec<ChainElement> {
        let mut chain = Vec::with_capacity(advisors.len());
        let mut has_introductions = None;

        for resolved in advisors {
            match resolved.advisor.kind() {
                AdvisorKind::Unconditional => {
                    chain.extend(resolved.interceptors.iter().cloned().map(ChainElement::Static));
                }
                AdvisorKind::Pointcut(pointcut) => {
                    let class_ok = pre_filtered
                        || target_type.map_or(true, |ty| pointcut.class_filter().matches(ty));
                    if !class_ok {
                        continue;
                    }

                    let matcher = pointcut.method_matcher();
                    let introductions = *has_introductions.get_or_insert_with(|| {
                        Self::has_matching_introductions(advisors, target_type)
                    });
                    if !matcher.matches_with_introductions(method, target_type, introductions) {
                        continue;
                    }

                    if matcher.is_runtime() {
                        chain.extend(resolved.interceptors.iter().map(|interceptor| {
                            ChainElement::Runtime {
                                interceptor: Arc::clone(interceptor),
                                matcher: Arc::clone(matcher),
                            }
                        }));
                    } else {
                        chain.extend(resolved.interceptors.iter().cloned().map(ChainElement::Static));
                    }
                }
                AdvisorKind::Introduction { class_filter, .. } => {
                    if pre_filtered || target_type.map_or(true, |ty| class_filter.matches(ty)) {
                        chain.extend(resolved.interceptors.iter().cloned().map(ChainElement::Static));
                    }
                }
            }
        }
        chain
    }
}
