// src/proxy/proxy.rs
//! The proxy object

use crate::interception::{AopContext, Invocation};
use crate::meta::{well_known, Capability, Method, TypeInfo};
use crate::observability::PROXY_INVOCATIONS;
use crate::proxy::ProxyConfig;
use crate::target::{Target, Value};
use crate::utils::errors::EngineError;
use metrics::counter;
use serde_json::json;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

static NEXT_PROXY_ID: AtomicU64 = AtomicU64::new(0);

/// How the proxy presents itself to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyShape {
    /// Implements only the proxied capabilities
    Interface,

    /// A subtype of the target's full type
    FullType,
}

impl ProxyShape {
    pub fn label(&self) -> &'static str {
        match self {
            ProxyShape::Interface => "interface",
            ProxyShape::FullType => "full_type",
        }
    }
}

/// Routes every call through the interceptor chain of its configuration
pub struct Proxy {
    id: u64,
    shape: ProxyShape,
    opaque: bool,
    config: Arc<ProxyConfig>,
    proxy_type: Arc<TypeInfo>,
    methods: HashMap<String, Method>,
    this: Weak<Proxy>,
}

impl Proxy {
    /// Proxy exposing `capabilities`, plus the proxy marker and (unless
    /// opaque) the `Advised` view.
    pub(crate) fn interface(config: &Arc<ProxyConfig>, capabilities: Vec<Arc<Capability>>) -> Arc<Proxy> {
        let id = NEXT_PROXY_ID.fetch_add(1, Ordering::Relaxed);
        let opaque = config.is_opaque();
        let mut builder = TypeInfo::builder(format!("$Proxy{id}"));
        for capability in complete_capabilities(capabilities, opaque) {
            builder = builder.implements(capability);
        }
        Self::assemble(id, ProxyShape::Interface, opaque, config, builder.build())
    }

    /// Proxy subtyping `base`; proxied capabilities the base lacks are
    /// added on top.
    pub(crate) fn full_type(config: &Arc<ProxyConfig>, base: Arc<TypeInfo>) -> Arc<Proxy> {
        let id = NEXT_PROXY_ID.fetch_add(1, Ordering::Relaxed);
        let opaque = config.is_opaque();
        let extra: Vec<Arc<Capability>> = config
            .proxied_interfaces()
            .into_iter()
            .filter(|c| !base.implements(c.name()))
            .collect();
        let mut builder = TypeInfo::builder(format!("{}$$Proxy{id}", base.name())).extends(base);
        for capability in complete_capabilities(extra, opaque) {
            builder = builder.implements(capability);
        }
        Self::assemble(id, ProxyShape::FullType, opaque, config, builder.build())
    }

    fn assemble(
        id: u64,
        shape: ProxyShape,
        opaque: bool,
        config: &Arc<ProxyConfig>,
        proxy_type: Arc<TypeInfo>,
    ) -> Arc<Proxy> {
        let methods = proxy_type
            .all_methods()
            .into_iter()
            .map(|m| (m.name().to_string(), m))
            .collect();
        Arc::new_cyclic(|this| Proxy {
            id,
            shape,
            opaque,
            config: Arc::clone(config),
            proxy_type,
            methods,
            this: this.clone(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn shape(&self) -> ProxyShape {
        self.shape
    }

    pub fn is_interface_proxy(&self) -> bool {
        self.shape == ProxyShape::Interface
    }

    pub fn is_full_type_proxy(&self) -> bool {
        self.shape == ProxyShape::FullType
    }

    /// Synthesized type of this proxy
    pub fn proxy_type(&self) -> &Arc<TypeInfo> {
        &self.proxy_type
    }

    /// Whether callers can use this proxy as `name` (a type or capability)
    pub fn is_assignable_to(&self, name: &str) -> bool {
        self.proxy_type.is_assignable_to(name)
    }

    /// The live configuration, unless the proxy is opaque
    pub fn advised(&self) -> Option<&Arc<ProxyConfig>> {
        if self.opaque {
            None
        } else {
            Some(&self.config)
        }
    }

    /// Exposed method by name
    pub fn resolve(&self, name: &str) -> Result<Method, EngineError> {
        self.methods
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::NoSuchMethod {
                method: name.to_string(),
                owner: self.proxy_type.name().to_string(),
            })
    }

    /// Call an exposed method by name
    pub fn call(&self, method: &str, args: Vec<Value>) -> anyhow::Result<Value> {
        let method = self.resolve(method)?;
        self.invoke_method(&method, args)
    }

    /// Run `method` through the interceptor chain
    pub fn invoke_method(&self, method: &Method, args: Vec<Value>) -> anyhow::Result<Value> {
        if !self.opaque && method.declaring_type() == well_known::ADVISED {
            return self.answer_advised(method);
        }

        counter!(PROXY_INVOCATIONS, "shape" => self.shape.label()).increment(1);
        trace!(proxy = self.id, method = %method, "Proxy call");

        let _exposure = if self.config.is_expose_proxy() {
            self.this.upgrade().map(AopContext::expose)
        } else {
            None
        };

        let target_source = self.config.target_source();
        let target_type = target_source.target_type();
        let chain = self.config.interceptor_chain(method, target_type.as_deref());
        let mut invocation = Invocation::new(target_source, method.clone(), args, chain)?
            .with_proxy(self.this.upgrade());
        invocation.proceed()
    }

    /// Calls on the `Advised` view are answered from the configuration
    /// without running the chain.
    fn answer_advised(&self, method: &Method) -> anyhow::Result<Value> {
        let config = &self.config;
        let value = match method.name() {
            "is_frozen" => json!(config.is_frozen()),
            "advisors" => json!(config
                .advisors()
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()),
            "proxied_interfaces" => json!(config
                .proxied_interfaces()
                .iter()
                .map(|c| c.name().to_string())
                .collect::<Vec<_>>()),
            "target_source" => json!(config.target_type().map(|t| t.name().to_string())),
            other => {
                return Err(EngineError::NoSuchMethod {
                    method: other.to_string(),
                    owner: well_known::ADVISED.to_string(),
                }
                .into())
            }
        };
        Ok(value)
    }
}

fn complete_capabilities(mut capabilities: Vec<Arc<Capability>>, opaque: bool) -> Vec<Arc<Capability>> {
    if !capabilities.iter().any(|c| c.name() == well_known::PROXY_MARKER) {
        capabilities.push(well_known::proxy_marker());
    }
    if !opaque && !capabilities.iter().any(|c| c.name() == well_known::ADVISED) {
        capabilities.push(well_known::advised());
    }
    capabilities
}

impl Target for Proxy {
    fn type_info(&self) -> Arc<TypeInfo> {
        Arc::clone(&self.proxy_type)
    }

    fn invoke(&self, method: &Method, args: &[Value]) -> anyhow::Result<Value> {
        let method = self.resolve(method.name())?;
        self.invoke_method(&method, args.to_vec())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("type", &self.proxy_type.name())
            .field("config", &self.config.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::Advice;
    use crate::proxy::ProxyFactory;
    use crate::target::DispatchTarget;

    fn greeter_target() -> Arc<DispatchTarget> {
        let greeter = Capability::builder("Greeter").method("greet").build();
        let ty = TypeInfo::builder("Person").implements(greeter).method("age").build();
        DispatchTarget::builder(ty)
            .on("greet", |args| {
                Ok(json!(format!("hello {}", args.first().and_then(|v| v.as_str()).unwrap_or("?"))))
            })
            .on("age", |_| Ok(json!(42)))
            .build()
    }

    #[test]
    fn test_interface_proxy_type() {
        let proxy = ProxyFactory::for_target(greeter_target()).unwrap().get_proxy().unwrap();
        assert!(proxy.is_interface_proxy());
        assert!(proxy.is_assignable_to("Greeter"));
        assert!(proxy.is_assignable_to(well_known::PROXY_MARKER));
        assert!(proxy.is_assignable_to(well_known::ADVISED));
        assert!(!proxy.is_assignable_to("Person"));

        assert_eq!(proxy.call("greet", vec![json!("bob")]).unwrap(), json!("hello bob"));
        let err = proxy.call("age", vec![]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::NoSuchMethod { .. })
        ));
    }

    #[test]
    fn test_full_type_proxy_type() {
        let factory = ProxyFactory::for_target(greeter_target()).unwrap();
        factory.set_proxy_target_type(true).unwrap();
        let proxy = factory.get_proxy().unwrap();
        assert!(proxy.is_full_type_proxy());
        assert!(proxy.is_assignable_to("Person"));
        assert!(proxy.is_assignable_to("Greeter"));
        assert!(proxy.proxy_type().name().starts_with("Person$$Proxy"));
        assert_eq!(proxy.call("age", vec![]).unwrap(), json!(42));
    }

    #[test]
    fn test_advised_view() {
        let factory = ProxyFactory::for_target(greeter_target()).unwrap();
        factory
            .add_advisor(crate::advice::Advisor::unconditional(Advice::around(|inv| inv.proceed())).with_name("noop"))
            .unwrap();
        let proxy = factory.get_proxy().unwrap();
        assert_eq!(proxy.call("advisors", vec![]).unwrap(), json!(["noop"]));
        assert_eq!(proxy.call("is_frozen", vec![]).unwrap(), json!(false));
        assert_eq!(proxy.call("target_source", vec![]).unwrap(), json!("Person"));
        assert!(proxy.advised().is_some());
    }

    #[test]
    fn test_opaque_proxy_hides_advised() {
        let factory = ProxyFactory::for_target(greeter_target()).unwrap();
        factory.set_opaque(true).unwrap();
        let proxy = factory.get_proxy().unwrap();
        assert!(proxy.advised().is_none());
        assert!(!proxy.is_assignable_to(well_known::ADVISED));
        assert!(proxy.call("advisors", vec![]).is_err());
    }

    #[test]
    fn test_proxy_as_target() {
        let inner = ProxyFactory::for_target(greeter_target()).unwrap().get_proxy().unwrap();
        let outer = ProxyFactory::for_target(inner).unwrap();
        outer.add_advice(Advice::around(|inv| {
            let value = inv.proceed()?;
            Ok(json!(format!("[{}]", value.as_str().unwrap_or_default())))
        })).unwrap();
        let outer = outer.get_proxy().unwrap();
        assert_eq!(outer.call("greet", vec![json!("amy")]).unwrap(), json!("[hello amy]"));
    }
}
