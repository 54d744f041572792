// src/autoproxy/creator.rs
//! Auto-proxy creator
//!
//! Decides per candidate whether any declared advisor applies and wraps the
//! candidate in a proxy when one does. Decisions are cached per candidate
//! name; concurrent initialization of the same instance yields exactly one
//! proxy.

use crate::advice::{AdapterRegistry, Advice, Advisor};
use crate::autoproxy::{AdvisorExtension, AutoProxySettings, ExposeInvocationExtension, TargetSourceCreator};
use crate::meta::{well_known, TypeInfo};
use crate::proxy::{evaluate_proxy_interfaces, AopProxyFactory, DefaultAopProxyFactory, Proxy, ProxyConfig, ProxyFactory, ProxySettings};
use crate::target::{SingletonTargetSource, Target, TargetSource};
use crate::utils::config::EngineConfig;
use crate::utils::errors::{EngineError, Result};
use dashmap::{DashMap, DashSet};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace};

const ORIGINAL_INSTANCE_SUFFIX: &str = ".ORIGINAL";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CandidateKey {
    name: String,
    instance: usize,
}

/// Published wrapping decision for one candidate instance. Only weak
/// references are kept so the cache never extends a candidate's lifetime.
struct Wrapped {
    candidate: Weak<dyn Target>,
    result: Weak<dyn Target>,
}

impl Wrapped {
    fn is_live(&self) -> bool {
        self.candidate.strong_count() > 0 && self.result.strong_count() > 0
    }

    fn live_result(&self) -> Option<Arc<dyn Target>> {
        if self.candidate.strong_count() == 0 {
            return None;
        }
        self.result.upgrade()
    }
}

impl CandidateKey {
    fn new(name: &str, candidate: &Arc<dyn Target>) -> Self {
        Self {
            name: name.to_string(),
            instance: Arc::as_ptr(candidate) as *const () as usize,
        }
    }
}

/// Wraps eligible candidates in proxies at container lifecycle touch-points
pub struct AutoProxyCreator {
    settings: RwLock<AutoProxySettings>,
    proxy_settings: RwLock<ProxySettings>,
    registry: Arc<AdapterRegistry>,
    aop_proxy_factory: Arc<dyn AopProxyFactory>,
    advisors: RwLock<Vec<Advisor>>,
    named_interceptors: DashMap<String, Advice>,
    common_interceptors: RwLock<Vec<String>>,
    extensions: RwLock<Vec<Arc<dyn AdvisorExtension>>>,
    target_source_creators: RwLock<Vec<Arc<dyn TargetSourceCreator>>>,

    /// name → whether candidates under this name get proxied
    advised_beans: DashMap<String, bool>,
    /// name → instance handed out through `early_reference`
    early_proxy_references: DashMap<String, usize>,
    /// names proxied through a custom target source
    target_sourced_beans: DashSet<String>,
    /// name → type of the proxy created for it
    proxy_types: DashMap<String, Arc<TypeInfo>>,
    /// one wrapping result per live candidate instance
    wrapped: DashMap<CandidateKey, Arc<OnceCell<Wrapped>>>,
}

impl AutoProxyCreator {
    /// Creator using the global adapter registry and default settings
    pub fn new() -> Self {
        Self::with_registry(AdapterRegistry::global())
    }

    pub fn with_registry(registry: Arc<AdapterRegistry>) -> Self {
        let extensions: Vec<Arc<dyn AdvisorExtension>> = vec![Arc::new(ExposeInvocationExtension)];
        Self {
            settings: RwLock::new(AutoProxySettings::default()),
            proxy_settings: RwLock::new(ProxySettings::default()),
            registry,
            aop_proxy_factory: Arc::new(DefaultAopProxyFactory),
            advisors: RwLock::new(Vec::new()),
            named_interceptors: DashMap::new(),
            common_interceptors: RwLock::new(Vec::new()),
            extensions: RwLock::new(extensions),
            target_source_creators: RwLock::new(Vec::new()),
            advised_beans: DashMap::new(),
            early_proxy_references: DashMap::new(),
            target_sourced_beans: DashSet::new(),
            proxy_types: DashMap::new(),
            wrapped: DashMap::new(),
        }
    }

    /// Creator configured from the `proxy` and `auto_proxy` sections
    pub fn from_config(config: &EngineConfig) -> Self {
        let creator = Self::new();
        creator.set_settings(config.auto_proxy.clone());
        creator.set_proxy_settings(config.proxy.clone());
        creator
    }

    pub fn set_settings(&self, settings: AutoProxySettings) {
        *self.settings.write() = settings;
    }

    pub fn settings(&self) -> AutoProxySettings {
        self.settings.read().clone()
    }

    /// Flags copied into every generated proxy configuration
    pub fn set_proxy_settings(&self, settings: ProxySettings) {
        *self.proxy_settings.write() = settings;
    }

    pub fn proxy_settings(&self) -> ProxySettings {
        self.proxy_settings.read().clone()
    }

    /// Declare an advisor; rejected if no adapter understands its advice
    pub fn add_advisor(&self, advisor: Advisor) -> Result<()> {
        self.registry.interceptors(&advisor)?;
        debug!(advisor = %advisor, order = advisor.order(), "Declared advisor");
        self.advisors.write().push(advisor);
        Ok(())
    }

    pub fn advisors(&self) -> Vec<Advisor> {
        self.advisors.read().clone()
    }

    /// Make `advice` available under `name` for `set_common_interceptors`
    pub fn register_interceptor(&self, name: impl Into<String>, advice: Advice) -> Result<()> {
        if !self.registry.supports(&advice) {
            return Err(EngineError::UnknownAdviceType(advice.kind().to_string()));
        }
        self.named_interceptors.insert(name.into(), advice);
        Ok(())
    }

    /// Interceptors applied to every proxy this creator builds, by name
    pub fn set_common_interceptors<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.common_interceptors.write() = names.into_iter().map(Into::into).collect();
    }

    pub fn add_extension(&self, extension: Arc<dyn AdvisorExtension>) {
        self.extensions.write().push(extension);
    }

    pub fn add_target_source_creator(&self, creator: Arc<dyn TargetSourceCreator>) {
        self.target_source_creators.write().push(creator);
    }

    pub fn set_aop_proxy_factory(&mut self, aop_proxy_factory: Arc<dyn AopProxyFactory>) {
        self.aop_proxy_factory = aop_proxy_factory;
    }

    /// Cached decision for `name`, if one was made
    pub fn is_advised(&self, name: &str) -> Option<bool> {
        self.advised_beans.get(name).map(|entry| *entry.value())
    }

    /// Type of the proxy created for `name`, if any
    pub fn predict_proxy_type(&self, name: &str) -> Option<Arc<TypeInfo>> {
        self.proxy_types.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop every cached decision and wrapping result for `name`
    pub fn forget(&self, name: &str) {
        self.advised_beans.remove(name);
        self.early_proxy_references.remove(name);
        self.target_sourced_beans.remove(name);
        self.proxy_types.remove(name);
        self.wrapped.retain(|key, _| key.name != name);
    }

    // ----- lifecycle touch-points -----

    /// Before the candidate exists: proxy a custom target source if a
    /// registered creator supplies one.
    pub fn before_instantiation(&self, target_type: &Arc<TypeInfo>, name: &str) -> Result<Option<Arc<Proxy>>> {
        if !self.target_sourced_beans.contains(name) {
            if self.advised_beans.contains_key(name) {
                return Ok(None);
            }
            if self.is_infrastructure(target_type) || self.should_skip(target_type, name) {
                self.advised_beans.insert(name.to_string(), false);
                return Ok(None);
            }
        }

        let creators = self.target_source_creators.read().clone();
        for creator in creators {
            if let Some(target_source) = creator.target_source(target_type, name) {
                self.target_sourced_beans.insert(name.to_string());
                let advisors = self.eligible_advisors(target_type, name);
                let proxy = self.create_proxy(target_type, name, target_source, advisors)?;
                info!(candidate = name, proxy = %proxy.proxy_type(), "Proxied custom target source");
                return Ok(Some(proxy));
            }
        }
        Ok(None)
    }

    /// A reference handed out while the candidate is still being
    /// initialized; the later `after_initialization` returns the candidate
    /// unchanged for the same instance.
    pub fn early_reference(&self, candidate: Arc<dyn Target>, name: &str) -> Result<Arc<dyn Target>> {
        let key = CandidateKey::new(name, &candidate);
        self.early_proxy_references.insert(name.to_string(), key.instance);
        self.wrap_once(key, candidate, name)
    }

    /// After the candidate is initialized: the proxy if any advisor applies,
    /// the candidate itself otherwise.
    pub fn after_initialization(&self, candidate: Arc<dyn Target>, name: &str) -> Result<Arc<dyn Target>> {
        let key = CandidateKey::new(name, &candidate);
        let was_early = self
            .early_proxy_references
            .remove_if(name, |_, instance| *instance == key.instance)
            .is_some();
        if was_early {
            trace!(candidate = name, "Early reference already handed out");
            return Ok(candidate);
        }
        self.wrap_once(key, candidate, name)
    }

    fn wrap_once(&self, key: CandidateKey, candidate: Arc<dyn Target>, name: &str) -> Result<Arc<dyn Target>> {
        loop {
            let cell = Arc::clone(self.wrapped.entry(key.clone()).or_default().value());
            let mut fresh = None;
            let published = cell.get_or_try_init(|| {
                let result = self.wrap_if_necessary(Arc::clone(&candidate), name)?;
                let wrapped = Wrapped {
                    candidate: Arc::downgrade(&candidate),
                    result: Arc::downgrade(&result),
                };
                fresh = Some(result);
                Ok::<_, EngineError>(wrapped)
            })?;

            if let Some(result) = fresh {
                self.prune_wrapped();
                return Ok(result);
            }
            if let Some(result) = published.live_result() {
                return Ok(result);
            }
            // Stale: the proxy handed out earlier was dropped, or the address
            // now belongs to a different instance.
            self.wrapped.remove_if(&key, |_, current| Arc::ptr_eq(current, &cell));
        }
    }

    /// Drop published entries whose candidate or result no longer exists
    fn prune_wrapped(&self) {
        self.wrapped
            .retain(|_, cell| cell.get().map_or(true, Wrapped::is_live));
    }

    fn wrap_if_necessary(&self, candidate: Arc<dyn Target>, name: &str) -> Result<Arc<dyn Target>> {
        if self.target_sourced_beans.contains(name) {
            return Ok(candidate);
        }
        if self.is_advised(name) == Some(false) {
            return Ok(candidate);
        }

        let target_type = candidate.type_info();
        if self.is_infrastructure(&target_type) || self.should_skip(&target_type, name) {
            self.advised_beans.insert(name.to_string(), false);
            return Ok(candidate);
        }

        let advisors = self.eligible_advisors(&target_type, name);
        if advisors.is_empty() {
            trace!(candidate = name, "No eligible advisors");
            self.advised_beans.insert(name.to_string(), false);
            return Ok(candidate);
        }

        self.advised_beans.insert(name.to_string(), true);
        let target_source: Arc<dyn TargetSource> = Arc::new(SingletonTargetSource::new(candidate));
        let proxy = self.create_proxy(&target_type, name, target_source, advisors)?;
        info!(candidate = name, proxy = %proxy.proxy_type(), "Auto-proxied candidate");
        Ok(proxy)
    }

    fn is_infrastructure(&self, target_type: &TypeInfo) -> bool {
        let infrastructure = well_known::is_infrastructure_type(target_type);
        if infrastructure {
            trace!(target = %target_type, "Skipping infrastructure type");
        }
        infrastructure
    }

    fn should_skip(&self, _target_type: &TypeInfo, name: &str) -> bool {
        name.ends_with(ORIGINAL_INSTANCE_SUFFIX)
    }

    // ----- eligibility -----

    /// Declared advisors applying to `target_type`, extended and sorted by
    /// order (stable, so equal orders keep declaration order)
    pub fn eligible_advisors(&self, target_type: &TypeInfo, name: &str) -> Vec<Advisor> {
        let candidates = self.advisors.read().clone();

        let mut eligible: Vec<Advisor> = candidates
            .iter()
            .filter(|a| a.is_introduction() && a.can_apply(target_type, false))
            .cloned()
            .collect();
        let has_introductions = !eligible.is_empty();
        eligible.extend(
            candidates
                .iter()
                .filter(|a| !a.is_introduction() && a.can_apply(target_type, has_introductions))
                .cloned(),
        );

        if !eligible.is_empty() {
            for extension in self.extensions.read().iter() {
                extension.extend_advisors(&mut eligible);
            }
            eligible.sort_by_key(|a| a.order());
        }
        debug!(candidate = name, eligible = eligible.len(), "Resolved eligible advisors");
        eligible
    }

    fn common_advisors(&self) -> Result<Vec<Advisor>> {
        self.common_interceptors
            .read()
            .iter()
            .map(|name| {
                let advice = self
                    .named_interceptors
                    .get(name)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| EngineError::ConfigError(format!("No interceptor registered under '{name}'")))?;
                self.registry.wrap(advice)
            })
            .collect()
    }

    fn create_proxy(
        &self,
        target_type: &Arc<TypeInfo>,
        name: &str,
        target_source: Arc<dyn TargetSource>,
        specific: Vec<Advisor>,
    ) -> Result<Arc<Proxy>> {
        let settings = self.settings();
        let proxy_settings = self.proxy_settings();

        let mut factory = ProxyFactory::from_config(Arc::new(ProxyConfig::with_registry(Arc::clone(&self.registry))));
        factory.set_aop_proxy_factory(Arc::clone(&self.aop_proxy_factory));
        factory.apply_settings(&ProxySettings {
            frozen: false,
            ..proxy_settings.clone()
        })?;
        if !factory.is_proxy_target_type() {
            evaluate_proxy_interfaces(target_type, factory.config())?;
        }

        let common = self.common_advisors()?;
        let advisors = if common.is_empty() {
            specific
        } else if settings.apply_common_interceptors_first {
            common.into_iter().chain(specific).collect()
        } else {
            specific.into_iter().chain(common).collect()
        };
        factory.add_advisors(advisors)?;
        factory.set_target_source(target_source)?;
        factory.set_pre_filtered(true)?;
        if settings.freeze_proxies || proxy_settings.frozen {
            factory.freeze()?;
        }

        let proxy = factory.get_proxy()?;
        self.proxy_types
            .insert(name.to_string(), Arc::clone(proxy.proxy_type()));
        Ok(proxy)
    }
}

impl Default for AutoProxyCreator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::current_invocation;
    use crate::matching::Pointcut;
    use crate::meta::Capability;
    use crate::target::{DispatchTarget, PrototypeTargetSource};
    use serde_json::json;

    fn order_service() -> Arc<DispatchTarget> {
        let orders = Capability::builder("OrderService")
            .method("place")
            .method("list")
            .build();
        let ty = TypeInfo::builder("DefaultOrderService").implements(orders).build();
        DispatchTarget::builder(ty)
            .on("place", |args| Ok(json!(format!("placed:{}", args.first().cloned().unwrap_or_default()))))
            .on("list", |_| Ok(json!([])))
            .build()
    }

    fn tagging(tag: &'static str) -> Advice {
        Advice::around(move |inv| {
            let value = inv.proceed()?;
            Ok(json!(format!("{tag}({})", value.as_str().unwrap_or_default())))
        })
    }

    #[test]
    fn test_no_eligible_advisor_returns_candidate() {
        let creator = AutoProxyCreator::new();
        creator
            .add_advisor(Advisor::new(tagging("x"), Pointcut::name_match(["delete"])))
            .unwrap();
        let candidate: Arc<dyn Target> = order_service();
        let result = creator.after_initialization(Arc::clone(&candidate), "orders").unwrap();
        assert!(Arc::ptr_eq(&result, &candidate));
        assert_eq!(creator.is_advised("orders"), Some(false));
    }

    #[test]
    fn test_eligible_candidate_is_proxied_and_sorted() {
        let creator = AutoProxyCreator::new();
        creator
            .add_advisor(Advisor::new(tagging("outer"), Pointcut::name_match(["place"])).with_order(10))
            .unwrap();
        creator
            .add_advisor(Advisor::new(tagging("inner"), Pointcut::name_match(["place"])).with_order(20))
            .unwrap();
        creator
            .add_advisor(Advisor::new(tagging("first"), Pointcut::name_match(["place"])).with_order(1))
            .unwrap();

        let result = creator.after_initialization(order_service(), "orders").unwrap();
        assert!(crate::proxy::is_aop_proxy(result.as_ref()));
        let method = result.type_info().find_method("place").unwrap();
        assert_eq!(
            result.invoke(&method, &[json!(1)]).unwrap(),
            json!("first(outer(inner(placed:1)))")
        );
        assert_eq!(creator.is_advised("orders"), Some(true));
        assert!(creator.predict_proxy_type("orders").is_some());
    }

    #[test]
    fn test_generated_configuration_is_pre_filtered() {
        let creator = AutoProxyCreator::new();
        creator.add_advisor(Advisor::new(tagging("t"), Pointcut::all())).unwrap();
        let result = creator.after_initialization(order_service(), "orders").unwrap();
        let proxy = result.as_any().downcast_ref::<Proxy>().unwrap();
        assert!(proxy.advised().unwrap().is_pre_filtered());
    }

    #[test]
    fn test_infrastructure_and_original_skipped() {
        let creator = AutoProxyCreator::new();
        creator.add_advisor(Advisor::new(tagging("t"), Pointcut::all())).unwrap();

        let infra_ty = TypeInfo::builder("LoggingAdvisor")
            .implements(well_known::advisor())
            .method("advice")
            .build();
        let infra: Arc<dyn Target> = DispatchTarget::builder(infra_ty).build();
        let result = creator.after_initialization(Arc::clone(&infra), "loggingAdvisor").unwrap();
        assert!(Arc::ptr_eq(&result, &infra));

        let original: Arc<dyn Target> = order_service();
        let result = creator
            .after_initialization(Arc::clone(&original), "orders.ORIGINAL")
            .unwrap();
        assert!(Arc::ptr_eq(&result, &original));
        assert_eq!(creator.is_advised("orders.ORIGINAL"), Some(false));
    }

    #[test]
    fn test_same_instance_wrapped_once() {
        let creator = AutoProxyCreator::new();
        creator.add_advisor(Advisor::new(tagging("t"), Pointcut::all())).unwrap();
        let candidate: Arc<dyn Target> = order_service();
        let a = creator.after_initialization(Arc::clone(&candidate), "orders").unwrap();
        let b = creator.after_initialization(Arc::clone(&candidate), "orders").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        creator.forget("orders");
        let c = creator.after_initialization(candidate, "orders").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_wrapping_cache_does_not_retain_candidates() {
        let creator = AutoProxyCreator::new();
        creator
            .add_advisor(Advisor::new(tagging("t"), Pointcut::name_match(["place"])))
            .unwrap();

        let mut released = Vec::new();
        for _ in 0..100 {
            let candidate: Arc<dyn Target> = order_service();
            released.push(Arc::downgrade(&candidate));
            let proxy = creator.after_initialization(candidate, "prototypeOrders").unwrap();
            assert!(crate::proxy::is_aop_proxy(proxy.as_ref()));
        }

        assert!(released.iter().all(|weak| weak.upgrade().is_none()));
        assert!(creator.wrapped.len() <= 1);
        assert_eq!(creator.is_advised("prototypeOrders"), Some(true));
    }

    #[test]
    fn test_unproxied_candidate_not_retained() {
        let creator = AutoProxyCreator::new();
        let candidate: Arc<dyn Target> = order_service();
        let weak = Arc::downgrade(&candidate);
        let result = creator.after_initialization(candidate, "plain").unwrap();
        drop(result);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_early_reference_not_wrapped_twice() {
        let creator = AutoProxyCreator::new();
        creator.add_advisor(Advisor::new(tagging("t"), Pointcut::all())).unwrap();
        let candidate: Arc<dyn Target> = order_service();

        let early = creator.early_reference(Arc::clone(&candidate), "orders").unwrap();
        assert!(crate::proxy::is_aop_proxy(early.as_ref()));
        let late = creator.after_initialization(Arc::clone(&candidate), "orders").unwrap();
        assert!(Arc::ptr_eq(&late, &candidate));
    }

    #[test]
    fn test_common_interceptors_order() {
        let creator = AutoProxyCreator::new();
        creator
            .add_advisor(Advisor::new(tagging("specific"), Pointcut::name_match(["place"])))
            .unwrap();
        creator.register_interceptor("audit", tagging("common")).unwrap();
        creator.set_common_interceptors(["audit"]);

        let first = creator.after_initialization(order_service(), "a").unwrap();
        let method = first.type_info().find_method("place").unwrap();
        assert_eq!(
            first.invoke(&method, &[json!(1)]).unwrap(),
            json!("common(specific(placed:1))")
        );

        creator.set_settings(AutoProxySettings {
            apply_common_interceptors_first: false,
            ..Default::default()
        });
        let last = creator.after_initialization(order_service(), "b").unwrap();
        assert_eq!(
            last.invoke(&method, &[json!(1)]).unwrap(),
            json!("specific(common(placed:1))")
        );
    }

    #[test]
    fn test_unknown_common_interceptor_is_config_error() {
        let creator = AutoProxyCreator::new();
        creator.add_advisor(Advisor::new(tagging("t"), Pointcut::all())).unwrap();
        creator.set_common_interceptors(["missing"]);
        let err = match creator.after_initialization(order_service(), "orders") {
            Err(e) => e,
            Ok(_) => panic!("missing common interceptor should fail"),
        };
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_freeze_proxies() {
        let creator = AutoProxyCreator::new();
        creator.add_advisor(Advisor::new(tagging("t"), Pointcut::all())).unwrap();
        creator.set_settings(AutoProxySettings {
            freeze_proxies: true,
            ..Default::default()
        });
        let result = creator.after_initialization(order_service(), "orders").unwrap();
        let proxy = result.as_any().downcast_ref::<Proxy>().unwrap();
        assert!(proxy.advised().unwrap().is_frozen());
    }

    #[test]
    fn test_expose_invocation_added_for_context_advisors() {
        let creator = AutoProxyCreator::new();
        let reads_context = Advice::around(|inv| {
            inv.proceed()?;
            Ok(json!(current_invocation()?.method.name()))
        });
        creator
            .add_advisor(Advisor::new(reads_context, Pointcut::all()).requiring_invocation_context())
            .unwrap();

        let result = creator.after_initialization(order_service(), "orders").unwrap();
        let method = result.type_info().find_method("list").unwrap();
        assert_eq!(result.invoke(&method, &[]).unwrap(), json!("list"));
    }

    #[test]
    fn test_before_instantiation_with_target_source_creator() {
        struct PrototypeCreator;

        impl TargetSourceCreator for PrototypeCreator {
            fn target_source(&self, target_type: &Arc<TypeInfo>, name: &str) -> Option<Arc<dyn TargetSource>> {
                if !name.starts_with("prototype:") {
                    return None;
                }
                Some(Arc::new(PrototypeTargetSource::new(Arc::clone(target_type), || {
                    let target: Arc<dyn Target> = order_service();
                    Ok(target)
                })))
            }
        }

        let creator = AutoProxyCreator::new();
        creator.add_advisor(Advisor::new(tagging("t"), Pointcut::name_match(["place"]))).unwrap();
        creator.add_target_source_creator(Arc::new(PrototypeCreator));

        let ty = order_service().type_info();
        assert!(creator.before_instantiation(&ty, "orders").unwrap().is_none());

        let proxy = creator
            .before_instantiation(&ty, "prototype:orders")
            .unwrap()
            .unwrap();
        assert_eq!(proxy.call("place", vec![json!(2)]).unwrap(), json!("t(placed:2)"));

        // the late touch-point leaves target-sourced candidates alone
        let candidate: Arc<dyn Target> = order_service();
        let result = creator
            .after_initialization(Arc::clone(&candidate), "prototype:orders")
            .unwrap();
        assert!(Arc::ptr_eq(&result, &candidate));
    }

    #[test]
    fn test_from_config_copies_settings() {
        let mut config = EngineConfig::default();
        config.proxy.expose_proxy = true;
        config.auto_proxy.freeze_proxies = true;
        let creator = AutoProxyCreator::from_config(&config);
        assert!(creator.proxy_settings().expose_proxy);
        assert!(creator.settings().freeze_proxies);
    }
}
