// src/proxy/factory.rs
//! Programmatic proxy creation

use crate::advice::Advice;
use crate::meta::Capability;
use crate::proxy::strategy::{evaluate_proxy_interfaces, DefaultAopProxyFactory};
use crate::proxy::{Proxy, ProxyConfig};
use crate::target::{Target, TargetSource};
use crate::utils::errors::Result;
use std::ops::Deref;
use std::sync::Arc;

pub use crate::proxy::strategy::AopProxyFactory;

/// Configuration plus the strategy that turns it into proxies.
///
/// Dereferences to the [`ProxyConfig`], so advisors and flags are set
/// directly on the factory.
pub struct ProxyFactory {
    config: Arc<ProxyConfig>,
    aop_proxy_factory: Arc<dyn AopProxyFactory>,
}

impl ProxyFactory {
    pub fn new() -> Self {
        Self::from_config(Arc::new(ProxyConfig::new()))
    }

    pub fn from_config(config: Arc<ProxyConfig>) -> Self {
        Self {
            config,
            aop_proxy_factory: Arc::new(DefaultAopProxyFactory),
        }
    }

    /// Proxy `target`, exposing its capabilities when it has a reasonable
    /// one and its full type otherwise
    pub fn for_target(target: Arc<dyn Target>) -> Result<Self> {
        let factory = Self::new();
        let target_type = target.type_info();
        factory.config.set_target(target)?;
        evaluate_proxy_interfaces(&target_type, &factory.config)?;
        Ok(factory)
    }

    /// Target-less proxy implementing `capability`; `interceptor` answers
    /// every call
    pub fn for_capability(capability: Arc<Capability>, interceptor: Advice) -> Result<Self> {
        let factory = Self::new();
        factory.config.add_interface(capability)?;
        factory.config.add_advice(interceptor)?;
        Ok(factory)
    }

    /// Full-type proxy over whatever `target_source` hands out
    pub fn for_target_source(target_source: Arc<dyn TargetSource>) -> Result<Self> {
        let factory = Self::new();
        factory.config.set_target_source(target_source)?;
        factory.config.set_proxy_target_type(true)?;
        Ok(factory)
    }

    pub fn config(&self) -> &Arc<ProxyConfig> {
        &self.config
    }

    pub fn set_aop_proxy_factory(&mut self, aop_proxy_factory: Arc<dyn AopProxyFactory>) {
        self.aop_proxy_factory = aop_proxy_factory;
    }

    /// Create a new proxy for the current configuration
    pub fn get_proxy(&self) -> Result<Arc<Proxy>> {
        self.config.create_proxy(self.aop_proxy_factory.as_ref())
    }
}

impl Default for ProxyFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for ProxyFactory {
    type Target = ProxyConfig;

    fn deref(&self) -> &ProxyConfig {
        &self.config
    }
}
