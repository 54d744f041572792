// src/meta/well_known.rs
//! Well-known capabilities recognized by the engine
//!
//! Three groups matter to proxy construction:
//! - configuration callbacks (lifecycle hooks, never business behavior)
//! - proxy machinery (capabilities every generated proxy carries)
//! - infrastructure markers (types that must never be auto-proxied)

use crate::meta::type_info::{Capability, TypeInfo};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const INITIALIZING: &str = "Initializing";
pub const DISPOSABLE: &str = "Disposable";
pub const CLOSEABLE: &str = "Closeable";
pub const AUTO_CLOSEABLE: &str = "AutoCloseable";
pub const AWARE: &str = "Aware";

pub const PROXY_MARKER: &str = "ProxyMarker";
pub const ADVISED: &str = "Advised";
pub const PROXY_FACTORY_INTERNAL: &str = "ProxyFactoryInternal";

pub const ADVICE: &str = "Advice";
pub const POINTCUT: &str = "Pointcut";
pub const ADVISOR: &str = "Advisor";
pub const AOP_INFRASTRUCTURE: &str = "AopInfrastructure";

static INITIALIZING_CAP: Lazy<Arc<Capability>> =
    Lazy::new(|| Capability::builder(INITIALIZING).method("after_properties_set").build());

static DISPOSABLE_CAP: Lazy<Arc<Capability>> =
    Lazy::new(|| Capability::builder(DISPOSABLE).method("destroy").build());

static AUTO_CLOSEABLE_CAP: Lazy<Arc<Capability>> =
    Lazy::new(|| Capability::builder(AUTO_CLOSEABLE).method("close").build());

static CLOSEABLE_CAP: Lazy<Arc<Capability>> = Lazy::new(|| {
    Capability::builder(CLOSEABLE)
        .method("close")
        .extends(AUTO_CLOSEABLE_CAP.clone())
        .build()
});

static AWARE_CAP: Lazy<Arc<Capability>> = Lazy::new(|| Capability::builder(AWARE).build());

static PROXY_MARKER_CAP: Lazy<Arc<Capability>> =
    Lazy::new(|| Capability::builder(PROXY_MARKER).build());

static ADVISED_CAP: Lazy<Arc<Capability>> = Lazy::new(|| {
    Capability::builder(ADVISED)
        .method("is_frozen")
        .method("advisors")
        .method("proxied_interfaces")
        .method("target_source")
        .build()
});

static PROXY_FACTORY_INTERNAL_CAP: Lazy<Arc<Capability>> = Lazy::new(|| {
    Capability::builder(PROXY_FACTORY_INTERNAL)
        .method("new_instance")
        .method("set_callbacks")
        .build()
});

static ADVICE_CAP: Lazy<Arc<Capability>> = Lazy::new(|| Capability::builder(ADVICE).build());

static POINTCUT_CAP: Lazy<Arc<Capability>> = Lazy::new(|| {
    Capability::builder(POINTCUT)
        .method("class_filter")
        .method("method_matcher")
        .build()
});

static ADVISOR_CAP: Lazy<Arc<Capability>> = Lazy::new(|| {
    Capability::builder(ADVISOR)
        .method("advice")
        .method("is_per_instance")
        .build()
});

static AOP_INFRASTRUCTURE_CAP: Lazy<Arc<Capability>> =
    Lazy::new(|| Capability::builder(AOP_INFRASTRUCTURE).build());

pub fn initializing() -> Arc<Capability> {
    INITIALIZING_CAP.clone()
}

pub fn disposable() -> Arc<Capability> {
    DISPOSABLE_CAP.clone()
}

pub fn closeable() -> Arc<Capability> {
    CLOSEABLE_CAP.clone()
}

pub fn auto_closeable() -> Arc<Capability> {
    AUTO_CLOSEABLE_CAP.clone()
}

/// Marker that container callback capabilities extend
pub fn aware() -> Arc<Capability> {
    AWARE_CAP.clone()
}

/// Marker carried by every generated proxy
pub fn proxy_marker() -> Arc<Capability> {
    PROXY_MARKER_CAP.clone()
}

/// Capability exposing the proxy configuration (absent on opaque proxies)
pub fn advised() -> Arc<Capability> {
    ADVISED_CAP.clone()
}

pub fn proxy_factory_internal() -> Arc<Capability> {
    PROXY_FACTORY_INTERNAL_CAP.clone()
}

pub fn advice() -> Arc<Capability> {
    ADVICE_CAP.clone()
}

pub fn pointcut() -> Arc<Capability> {
    POINTCUT_CAP.clone()
}

pub fn advisor() -> Arc<Capability> {
    ADVISOR_CAP.clone()
}

pub fn aop_infrastructure() -> Arc<Capability> {
    AOP_INFRASTRUCTURE_CAP.clone()
}

/// Lifecycle/framework callback contract rather than business behavior
pub fn is_configuration_callback(capability: &Capability) -> bool {
    matches!(
        capability.name(),
        INITIALIZING | DISPOSABLE | CLOSEABLE | AUTO_CLOSEABLE
    ) || capability.extends().iter().any(|c| c.name() == AWARE)
}

/// Capability owned by the proxy-construction machinery itself
pub fn is_internal_machinery(capability: &Capability) -> bool {
    matches!(
        capability.name(),
        PROXY_MARKER | ADVISED | PROXY_FACTORY_INTERNAL
    )
}

/// Types implementing AOP building blocks are never auto-proxied
pub fn is_infrastructure_type(ty: &TypeInfo) -> bool {
    [ADVICE, POINTCUT, ADVISOR, AOP_INFRASTRUCTURE]
        .iter()
        .any(|marker| ty.implements(marker))
}
