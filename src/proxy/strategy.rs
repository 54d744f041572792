// src/proxy/strategy.rs
//! Choosing between capability proxies and full-type proxies

use crate::meta::{well_known, Capability, TypeInfo};
use crate::proxy::{Proxy, ProxyConfig};
use crate::utils::errors::{EngineError, Result};
use std::sync::Arc;
use tracing::debug;

/// Creates the proxy object for a configuration
pub trait AopProxyFactory: Send + Sync {
    fn create_aop_proxy(&self, config: &Arc<ProxyConfig>) -> Result<Arc<Proxy>>;
}

/// Full-type proxy when asked to optimize, when asked for the target type,
/// or when no user capability is configured; capability proxy otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAopProxyFactory;

impl DefaultAopProxyFactory {
    fn has_no_user_supplied_interfaces(interfaces: &[Arc<Capability>]) -> bool {
        match interfaces {
            [] => true,
            [only] => only.name() == well_known::PROXY_MARKER,
            _ => false,
        }
    }
}

impl AopProxyFactory for DefaultAopProxyFactory {
    fn create_aop_proxy(&self, config: &Arc<ProxyConfig>) -> Result<Arc<Proxy>> {
        let settings = config.settings();
        let interfaces = config.proxied_interfaces();

        if settings.optimize
            || settings.proxy_target_type
            || Self::has_no_user_supplied_interfaces(&interfaces)
        {
            let target_type = config.target_type().ok_or_else(|| {
                EngineError::NoTargetType(
                    "either a capability or a target is required for proxy creation".into(),
                )
            })?;

            // a proxy target can only be proxied through its capabilities
            if target_type.implements(well_known::PROXY_MARKER) {
                let capabilities = if interfaces.is_empty() {
                    target_type.capabilities().to_vec()
                } else {
                    interfaces
                };
                debug!(target = %target_type, "Proxying proxy target by capability");
                return Ok(Proxy::interface(config, capabilities));
            }
            return Ok(Proxy::full_type(config, target_type));
        }

        Ok(Proxy::interface(config, interfaces))
    }
}

/// Whether `ty` exposes a capability worth proxying by itself: not a
/// configuration callback, not proxy machinery, with at least one method.
pub fn has_reasonable_proxy_interface(ty: &TypeInfo) -> bool {
    ty.all_capabilities().iter().any(|c| {
        !well_known::is_configuration_callback(c)
            && !well_known::is_internal_machinery(c)
            && !c.all_methods().is_empty()
    })
}

/// Proxy every capability of `ty` if one is reasonable, otherwise fall back
/// to full-type proxying.
pub fn evaluate_proxy_interfaces(ty: &TypeInfo, config: &ProxyConfig) -> Result<()> {
    if has_reasonable_proxy_interface(ty) {
        for capability in ty.all_capabilities() {
            config.add_interface(capability)?;
        }
    } else {
        debug!(target = %ty, "No reasonable capability, proxying full type");
        config.set_proxy_target_type(true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{EmptyTargetSource, SingletonTargetSource, DispatchTarget};

    #[test]
    fn test_callbacks_are_not_reasonable() {
        let ty = TypeInfo::builder("Resource")
            .implements(well_known::disposable())
            .implements(well_known::initializing())
            .implements(well_known::closeable())
            .method("read")
            .build();
        assert!(!has_reasonable_proxy_interface(&ty));
    }

    #[test]
    fn test_marker_capability_without_methods_is_not_reasonable() {
        let marker = Capability::builder("Serializable").build();
        let ty = TypeInfo::builder("Value").implements(marker).build();
        assert!(!has_reasonable_proxy_interface(&ty));
    }

    #[test]
    fn test_business_capability_is_reasonable() {
        let greeter = Capability::builder("Greeter").method("greet").build();
        let ty = TypeInfo::builder("Person")
            .implements(well_known::disposable())
            .implements(greeter)
            .build();
        assert!(has_reasonable_proxy_interface(&ty));

        let config = ProxyConfig::new();
        evaluate_proxy_interfaces(&ty, &config).unwrap();
        assert!(config.is_interface_proxied("Greeter"));
        assert!(config.is_interface_proxied(well_known::DISPOSABLE));
        assert!(!config.is_proxy_target_type());
    }

    #[test]
    fn test_fallback_to_full_type() {
        let ty = TypeInfo::builder("Plain").implements(well_known::disposable()).method("run").build();
        let config = ProxyConfig::new();
        evaluate_proxy_interfaces(&ty, &config).unwrap();
        assert!(config.is_proxy_target_type());
        assert!(config.proxied_interfaces().is_empty());
    }

    #[test]
    fn test_no_target_type_is_an_error() {
        let config = Arc::new(ProxyConfig::new());
        config.set_target_source(Arc::new(EmptyTargetSource::new())).unwrap();
        let err = DefaultAopProxyFactory.create_aop_proxy(&config).unwrap_err();
        assert!(matches!(err, EngineError::NoTargetType(_)));
    }

    #[test]
    fn test_only_marker_interface_means_full_type() {
        let ty = TypeInfo::builder("Plain").method("run").build();
        let target = DispatchTarget::builder(ty).on("run", |_| Ok(serde_json::json!(1))).build();
        let config = Arc::new(ProxyConfig::new());
        config.set_target_source(Arc::new(SingletonTargetSource::new(target))).unwrap();
        config.add_interface(well_known::proxy_marker()).unwrap();
        let proxy = DefaultAopProxyFactory.create_aop_proxy(&config).unwrap();
        assert!(proxy.is_full_type_proxy());
    }

    #[test]
    fn test_optimize_prefers_full_type() {
        let greeter = Capability::builder("Greeter").method("greet").build();
        let ty = TypeInfo::builder("Person").implements(greeter.clone()).build();
        let config = Arc::new(ProxyConfig::new());
        config.set_target_source(Arc::new(EmptyTargetSource::for_type(ty))).unwrap();
        config.add_interface(greeter).unwrap();
        assert!(DefaultAopProxyFactory.create_aop_proxy(&config).unwrap().is_interface_proxy());
        config.set_optimize(true).unwrap();
        assert!(DefaultAopProxyFactory.create_aop_proxy(&config).unwrap().is_full_type_proxy());
    }
}
