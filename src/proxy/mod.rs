// src/proxy/mod.rs
//! Proxy configuration and creation
//!
//! - **config**: Mutable advisor list, target source and flags behind proxies
//! - **strategy**: Capability proxy vs. full-type proxy selection
//! - **factory**: Programmatic entry point tying config and strategy together
//! - **proxy**: The proxy object routing calls into the chain engine
//!
//! # Architecture
//!
//! ```text
//! ProxyFactory
//!     ├─ ProxyConfig (advisors, interfaces, target source, flags)
//!     └─ AopProxyFactory
//!           ├─ Interface proxy  → $ProxyN: capabilities + markers
//!           └─ Full-type proxy  → Base$$ProxyN: subtype of the target type
//! ```

pub mod config;
pub mod factory;
#[allow(clippy::module_inception)]
pub mod proxy;
pub mod strategy;

pub use config::{AdvisedListener, ProxyConfig, ProxySettings};
pub use factory::ProxyFactory;
pub use proxy::{Proxy, ProxyShape};
pub use strategy::{
    evaluate_proxy_interfaces, has_reasonable_proxy_interface, AopProxyFactory, DefaultAopProxyFactory,
};

use crate::target::Target;

/// Whether `target` is a proxy created by this engine
pub fn is_aop_proxy(target: &dyn Target) -> bool {
    target.as_any().is::<Proxy>()
}
