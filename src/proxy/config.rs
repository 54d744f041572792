// src/proxy/config.rs
//! Proxy configuration
//!
//! A [`ProxyConfig`] holds everything a proxy consults on each call: the
//! target source, the proxied capabilities, the ordered advisors, and the
//! behavior flags. It stays mutable after proxies are created (unless
//! frozen), and every advice change invalidates the per-method chain cache.
//!
//! Mutation and proxy creation are serialized by one lifecycle lock, so
//! listeners observe a consistent configuration. Reads, `is_active` and
//! listener registration stay available inside a callback; mutating the
//! configuration from inside a callback is not supported.

use crate::advice::{AdapterRegistry, Advice, Advisor};
use crate::interception::{AdvisorChainFactory, ChainElement, DefaultAdvisorChainFactory, ResolvedAdvisor};
use crate::meta::{Capability, Method, TypeInfo};
use crate::observability::{CHAIN_CACHE_MISSES, PROXIES_CREATED};
use crate::proxy::factory::AopProxyFactory;
use crate::proxy::Proxy;
use crate::target::{EmptyTargetSource, SingletonTargetSource, Target, TargetSource};
use crate::utils::errors::{EngineError, Result};
use dashmap::DashMap;
use metrics::counter;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

static NEXT_CONFIG_ID: AtomicU64 = AtomicU64::new(1);

/// Behavior flags shared by proxy configurations and the auto-proxy creator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Proxy the full target type instead of its capabilities
    pub proxy_target_type: bool,

    /// Let the strategy pick full-type proxying for speed
    pub optimize: bool,

    /// Hide the `Advised` view from proxies
    pub opaque: bool,

    /// Publish the proxy through `AopContext` during calls
    pub expose_proxy: bool,

    /// Reject every later mutation
    pub frozen: bool,
}

/// Notified about configuration lifecycle events
pub trait AdvisedListener: Send + Sync {
    /// First proxy creation; an error aborts activation
    fn activated(&self, config: &ProxyConfig) -> Result<()>;

    /// Advisor set changed after activation
    fn advice_changed(&self, config: &ProxyConfig);
}

struct ConfigState {
    settings: ProxySettings,
    pre_filtered: bool,
    target_source: Arc<dyn TargetSource>,
    interfaces: Vec<Arc<Capability>>,
    advisors: Vec<ResolvedAdvisor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ChainKey {
    method: Method,
    target_type: Option<Arc<str>>,
}

/// Mutable, shareable configuration behind one or more proxies
pub struct ProxyConfig {
    id: u64,
    registry: Arc<AdapterRegistry>,
    chain_factory: Arc<dyn AdvisorChainFactory>,
    state: RwLock<ConfigState>,
    /// serializes mutation and activation
    lifecycle: Mutex<()>,
    active: AtomicBool,
    listeners: RwLock<Vec<Arc<dyn AdvisedListener>>>,
    chain_cache: DashMap<ChainKey, Arc<[ChainElement]>>,
}

impl ProxyConfig {
    /// Empty configuration using the global adapter registry
    pub fn new() -> Self {
        Self::with_registry(AdapterRegistry::global())
    }

    pub fn with_registry(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            id: NEXT_CONFIG_ID.fetch_add(1, Ordering::Relaxed),
            registry,
            chain_factory: Arc::new(DefaultAdvisorChainFactory),
            state: RwLock::new(ConfigState {
                settings: ProxySettings::default(),
                pre_filtered: false,
                target_source: Arc::new(EmptyTargetSource::new()),
                interfaces: Vec::new(),
                advisors: Vec::new(),
            }),
            lifecycle: Mutex::new(()),
            active: AtomicBool::new(false),
            listeners: RwLock::new(Vec::new()),
            chain_cache: DashMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    /// Apply a mutation under the lifecycle lock. `f` must validate before
    /// changing anything so a failed mutation leaves the state untouched.
    fn mutate<R>(
        &self,
        operation: &str,
        advice_changed: bool,
        f: impl FnOnce(&mut ConfigState) -> Result<R>,
    ) -> Result<R> {
        let _lifecycle = self.lifecycle.lock();
        let result = {
            let mut state = self.state.write();
            if state.settings.frozen {
                return Err(EngineError::ConfigFrozen(operation.to_string()));
            }
            let result = f(&mut state)?;
            if advice_changed {
                self.chain_cache.clear();
            }
            result
        };

        if advice_changed {
            debug!(config = self.id, operation, "Advice changed");
            if self.is_active() {
                for listener in self.listeners() {
                    listener.advice_changed(self);
                }
            }
        }
        Ok(result)
    }

    fn resolve(&self, advisor: Advisor) -> Result<ResolvedAdvisor> {
        let interceptors = self.registry.interceptors(&advisor)?;
        Ok(ResolvedAdvisor {
            advisor,
            interceptors,
        })
    }

    fn add_introduced(state: &mut ConfigState, advisor: &Advisor) {
        for capability in advisor.introduced_capabilities() {
            if !state.interfaces.iter().any(|c| c.name() == capability.name()) {
                state.interfaces.push(Arc::clone(capability));
            }
        }
    }

    fn remove_introduced(state: &mut ConfigState, advisor: &Advisor) {
        for capability in advisor.introduced_capabilities() {
            state.interfaces.retain(|c| c.name() != capability.name());
        }
    }

    // ----- target -----

    pub fn set_target(&self, target: Arc<dyn Target>) -> Result<()> {
        self.set_target_source(Arc::new(SingletonTargetSource::new(target)))
    }

    pub fn set_target_source(&self, target_source: Arc<dyn TargetSource>) -> Result<()> {
        self.mutate("set_target_source", false, |state| {
            state.target_source = target_source;
            Ok(())
        })
    }

    pub fn target_source(&self) -> Arc<dyn TargetSource> {
        Arc::clone(&self.state.read().target_source)
    }

    /// Type of the target, if the target source knows it
    pub fn target_type(&self) -> Option<Arc<TypeInfo>> {
        self.state.read().target_source.target_type()
    }

    // ----- interfaces -----

    pub fn set_interfaces(&self, interfaces: Vec<Arc<Capability>>) -> Result<()> {
        self.mutate("set_interfaces", true, |state| {
            state.interfaces.clear();
            for capability in interfaces {
                if !state.interfaces.iter().any(|c| c.name() == capability.name()) {
                    state.interfaces.push(capability);
                }
            }
            Ok(())
        })
    }

    /// Add a proxied capability; duplicates are ignored
    pub fn add_interface(&self, capability: Arc<Capability>) -> Result<()> {
        self.mutate("add_interface", true, |state| {
            if !state.interfaces.iter().any(|c| c.name() == capability.name()) {
                state.interfaces.push(capability);
            }
            Ok(())
        })
    }

    pub fn remove_interface(&self, name: &str) -> Result<bool> {
        self.mutate("remove_interface", true, |state| {
            let before = state.interfaces.len();
            state.interfaces.retain(|c| c.name() != name);
            Ok(state.interfaces.len() != before)
        })
    }

    pub fn proxied_interfaces(&self) -> Vec<Arc<Capability>> {
        self.state.read().interfaces.clone()
    }

    /// Exact-name membership test
    pub fn is_interface_proxied(&self, name: &str) -> bool {
        self.state.read().interfaces.iter().any(|c| c.name() == name)
    }

    // ----- advisors -----

    pub fn add_advisor(&self, advisor: Advisor) -> Result<()> {
        self.add_advisors([advisor])
    }

    pub fn insert_advisor(&self, position: usize, advisor: Advisor) -> Result<()> {
        let resolved = self.resolve(advisor)?;
        self.mutate("insert_advisor", true, |state| {
            if position > state.advisors.len() {
                return Err(EngineError::AdvisorIndexOutOfBounds {
                    index: position,
                    len: state.advisors.len(),
                });
            }
            Self::add_introduced(state, &resolved.advisor);
            state.advisors.insert(position, resolved);
            Ok(())
        })
    }

    pub fn add_advisors(&self, advisors: impl IntoIterator<Item = Advisor>) -> Result<()> {
        let resolved = advisors
            .into_iter()
            .map(|advisor| self.resolve(advisor))
            .collect::<Result<Vec<_>>>()?;
        self.mutate("add_advisors", true, |state| {
            for advisor in resolved {
                Self::add_introduced(state, &advisor.advisor);
                state.advisors.push(advisor);
            }
            Ok(())
        })
    }

    /// Remove by identity; `false` if the advisor is not registered
    pub fn remove_advisor(&self, advisor: &Advisor) -> Result<bool> {
        self.mutate("remove_advisor", true, |state| {
            match state.advisors.iter().position(|r| r.advisor.ptr_eq(advisor)) {
                Some(index) => {
                    let removed = state.advisors.remove(index);
                    Self::remove_introduced(state, &removed.advisor);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    pub fn remove_advisor_at(&self, index: usize) -> Result<Advisor> {
        self.mutate("remove_advisor_at", true, |state| {
            if index >= state.advisors.len() {
                return Err(EngineError::AdvisorIndexOutOfBounds {
                    index,
                    len: state.advisors.len(),
                });
            }
            let removed = state.advisors.remove(index);
            Self::remove_introduced(state, &removed.advisor);
            Ok(removed.advisor)
        })
    }

    /// Swap `old` for `new` in place; `false` if `old` is not registered
    pub fn replace_advisor(&self, old: &Advisor, new: Advisor) -> Result<bool> {
        let resolved = self.resolve(new)?;
        self.mutate("replace_advisor", true, |state| {
            match state.advisors.iter().position(|r| r.advisor.ptr_eq(old)) {
                Some(index) => {
                    Self::remove_introduced(state, old);
                    Self::add_introduced(state, &resolved.advisor);
                    state.advisors[index] = resolved;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    pub fn index_of_advisor(&self, advisor: &Advisor) -> Option<usize> {
        self.state
            .read()
            .advisors
            .iter()
            .position(|r| r.advisor.ptr_eq(advisor))
    }

    pub fn advisors(&self) -> Vec<Advisor> {
        self.state
            .read()
            .advisors
            .iter()
            .map(|r| r.advisor.clone())
            .collect()
    }

    pub fn advisor_count(&self) -> usize {
        self.state.read().advisors.len()
    }

    // ----- advice -----

    /// Append bare advice as an unconditional advisor
    pub fn add_advice(&self, advice: Advice) -> Result<()> {
        let advisor = self.registry.wrap(advice)?;
        self.add_advisor(advisor)
    }

    pub fn insert_advice(&self, position: usize, advice: Advice) -> Result<()> {
        let advisor = self.registry.wrap(advice)?;
        self.insert_advisor(position, advisor)
    }

    /// Remove the first advisor holding `advice`
    pub fn remove_advice(&self, advice: &Advice) -> Result<bool> {
        self.mutate("remove_advice", true, |state| {
            match state.advisors.iter().position(|r| r.advisor.advice().ptr_eq(advice)) {
                Some(index) => {
                    let removed = state.advisors.remove(index);
                    Self::remove_introduced(state, &removed.advisor);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    pub fn index_of_advice(&self, advice: &Advice) -> Option<usize> {
        self.state
            .read()
            .advisors
            .iter()
            .position(|r| r.advisor.advice().ptr_eq(advice))
    }

    // ----- flags -----

    pub fn settings(&self) -> ProxySettings {
        self.state.read().settings.clone()
    }

    /// Copy every flag from `settings`; copying `frozen = true` freezes
    pub fn apply_settings(&self, settings: &ProxySettings) -> Result<()> {
        self.mutate("apply_settings", false, |state| {
            state.settings = settings.clone();
            Ok(())
        })
    }

    pub fn set_proxy_target_type(&self, value: bool) -> Result<()> {
        self.mutate("set_proxy_target_type", false, |state| {
            state.settings.proxy_target_type = value;
            Ok(())
        })
    }

    pub fn set_optimize(&self, value: bool) -> Result<()> {
        self.mutate("set_optimize", false, |state| {
            state.settings.optimize = value;
            Ok(())
        })
    }

    pub fn set_opaque(&self, value: bool) -> Result<()> {
        self.mutate("set_opaque", false, |state| {
            state.settings.opaque = value;
            Ok(())
        })
    }

    pub fn set_expose_proxy(&self, value: bool) -> Result<()> {
        self.mutate("set_expose_proxy", false, |state| {
            state.settings.expose_proxy = value;
            Ok(())
        })
    }

    /// Advisors are known to match the target type already
    pub fn set_pre_filtered(&self, value: bool) -> Result<()> {
        self.mutate("set_pre_filtered", true, |state| {
            state.pre_filtered = value;
            Ok(())
        })
    }

    /// Reject every later mutation
    pub fn freeze(&self) -> Result<()> {
        self.mutate("freeze", false, |state| {
            state.settings.frozen = true;
            Ok(())
        })
    }

    pub fn is_frozen(&self) -> bool {
        self.state.read().settings.frozen
    }

    pub fn is_proxy_target_type(&self) -> bool {
        self.state.read().settings.proxy_target_type
    }

    pub fn is_optimize(&self) -> bool {
        self.state.read().settings.optimize
    }

    pub fn is_opaque(&self) -> bool {
        self.state.read().settings.opaque
    }

    pub fn is_expose_proxy(&self) -> bool {
        self.state.read().settings.expose_proxy
    }

    pub fn is_pre_filtered(&self) -> bool {
        self.state.read().pre_filtered
    }

    // ----- lifecycle -----

    pub fn add_listener(&self, listener: Arc<dyn AdvisedListener>) {
        self.listeners.write().push(listener);
    }

    /// Remove by identity
    pub fn remove_listener(&self, listener: &Arc<dyn AdvisedListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !std::ptr::eq(Arc::as_ptr(l) as *const (), Arc::as_ptr(listener) as *const ()));
        listeners.len() != before
    }

    /// Snapshot taken before notifying, so callbacks may register listeners
    fn listeners(&self) -> Vec<Arc<dyn AdvisedListener>> {
        self.listeners.read().clone()
    }

    /// Whether a proxy has been created from this configuration
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Create a proxy. The first successful creation activates the
    /// configuration; if any listener refuses, no proxy is returned and the
    /// configuration stays inactive.
    pub fn create_proxy(self: &Arc<Self>, factory: &dyn AopProxyFactory) -> Result<Arc<Proxy>> {
        let _lifecycle = self.lifecycle.lock();
        let proxy = factory.create_aop_proxy(self)?;

        if !self.is_active() {
            for listener in self.listeners() {
                listener.activated(self).map_err(|e| match e {
                    EngineError::ActivationFailed(reason) => EngineError::ActivationFailed(reason),
                    other => EngineError::ActivationFailed(other.to_string()),
                })?;
            }
            self.active.store(true, Ordering::Release);
            info!(config = self.id, "Proxy configuration activated");
        }

        counter!(PROXIES_CREATED, "shape" => proxy.shape().label()).increment(1);
        debug!(config = self.id, proxy = %proxy.proxy_type(), "Created proxy");
        Ok(proxy)
    }

    // ----- chain -----

    /// Chain for `method` against `target_type`, cached until the advice
    /// changes.
    pub fn interceptor_chain(&self, method: &Method, target_type: Option<&TypeInfo>) -> Arc<[ChainElement]> {
        let key = ChainKey {
            method: method.clone(),
            target_type: target_type.map(|t| Arc::from(t.name())),
        };
        if let Some(chain) = self.chain_cache.get(&key) {
            return Arc::clone(chain.value());
        }

        let state = self.state.read();
        counter!(CHAIN_CACHE_MISSES).increment(1);
        let chain: Arc<[ChainElement]> = self
            .chain_factory
            .chain(&state.advisors, method, target_type, state.pre_filtered)
            .into();
        // inserted while holding the read lock so a concurrent clear cannot
        // be overtaken by a stale chain
        self.chain_cache.insert(key, Arc::clone(&chain));
        chain
    }

    /// Human-readable dump of the configuration
    pub fn to_proxy_config_string(&self) -> String {
        self.to_string()
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let interfaces: Vec<&str> = state.interfaces.iter().map(|c| c.name()).collect();
        let advisors: Vec<String> = state.advisors.iter().map(|r| r.advisor.to_string()).collect();
        let target = state
            .target_source
            .target_type()
            .map(|t| t.name().to_string())
            .unwrap_or_else(|| "none".to_string());
        write!(
            f,
            "{} interfaces [{}]; {} advisors [{}]; target [{}]; \
             proxy_target_type={}; optimize={}; opaque={}; expose_proxy={}; frozen={}",
            interfaces.len(),
            interfaces.join(", "),
            advisors.len(),
            advisors.join(", "),
            target,
            state.settings.proxy_target_type,
            state.settings.optimize,
            state.settings.opaque,
            state.settings.expose_proxy,
            state.settings.frozen,
        )
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProxyConfig#{} {{ {} }}", self.id, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Pointcut;
    use parking_lot::Mutex as TestMutex;

    fn passthrough() -> Advice {
        Advice::around(|inv| inv.proceed())
    }

    fn greeter() -> Arc<Capability> {
        Capability::builder("Greeter").method("greet").build()
    }

    #[derive(Default)]
    struct RecordingListener {
        events: TestMutex<Vec<String>>,
        refuse: bool,
    }

    impl AdvisedListener for RecordingListener {
        fn activated(&self, _config: &ProxyConfig) -> Result<()> {
            self.events.lock().push("activated".into());
            if self.refuse {
                return Err(EngineError::ActivationFailed("refused".into()));
            }
            Ok(())
        }

        fn advice_changed(&self, config: &ProxyConfig) {
            self.events.lock().push(format!("changed:{}", config.advisor_count()));
        }
    }

    #[test]
    fn test_advisor_positions() {
        let config = ProxyConfig::new();
        let a = Advisor::unconditional(passthrough());
        let b = Advisor::unconditional(passthrough());
        let c = Advisor::unconditional(passthrough());
        config.add_advisor(a.clone()).unwrap();
        config.add_advisor(c.clone()).unwrap();
        config.insert_advisor(1, b.clone()).unwrap();

        assert_eq!(config.index_of_advisor(&a), Some(0));
        assert_eq!(config.index_of_advisor(&b), Some(1));
        assert_eq!(config.index_of_advisor(&c), Some(2));

        let err = config.insert_advisor(9, Advisor::unconditional(passthrough())).unwrap_err();
        assert!(matches!(err, EngineError::AdvisorIndexOutOfBounds { index: 9, len: 3 }));

        assert!(config.remove_advisor(&b).unwrap());
        assert!(!config.remove_advisor(&b).unwrap());
        assert!(config.remove_advisor_at(1).unwrap().ptr_eq(&c));
        assert!(config.remove_advisor_at(5).is_err());
        assert_eq!(config.advisor_count(), 1);
    }

    #[test]
    fn test_replace_advisor() {
        let config = ProxyConfig::new();
        let a = Advisor::unconditional(passthrough());
        let b = Advisor::unconditional(passthrough());
        config.add_advisor(a.clone()).unwrap();
        assert!(config.replace_advisor(&a, b.clone()).unwrap());
        assert_eq!(config.index_of_advisor(&b), Some(0));
        assert_eq!(config.index_of_advisor(&a), None);
        assert!(!config.replace_advisor(&a, Advisor::unconditional(passthrough())).unwrap());
    }

    #[test]
    fn test_advice_wrapping_and_removal() {
        let config = ProxyConfig::new();
        let advice = passthrough();
        config.add_advice(advice.clone()).unwrap();
        assert_eq!(config.index_of_advice(&advice), Some(0));
        assert!(config.advisors()[0].pointcut().is_none());
        assert!(config.remove_advice(&advice).unwrap());
        assert_eq!(config.index_of_advice(&advice), None);
    }

    #[test]
    fn test_unknown_advice_rejected_without_change() {
        struct Unknown;
        let config = ProxyConfig::new();
        let err = config.add_advice(Advice::new(Unknown)).unwrap_err();
        assert!(matches!(err, EngineError::UnknownAdviceType(_)));
        assert_eq!(config.advisor_count(), 0);
    }

    #[test]
    fn test_frozen_rejects_every_mutation() {
        let config = ProxyConfig::new();
        config.add_advice(passthrough()).unwrap();
        config.freeze().unwrap();
        assert!(config.is_frozen());

        let frozen = |r: Result<()>| matches!(r, Err(EngineError::ConfigFrozen(_)));
        assert!(frozen(config.add_advice(passthrough())));
        assert!(frozen(config.add_interface(greeter())));
        assert!(frozen(config.set_expose_proxy(true)));
        assert!(frozen(config.set_target_source(Arc::new(EmptyTargetSource::new()))));
        assert!(matches!(config.remove_advisor_at(0), Err(EngineError::ConfigFrozen(_))));
        assert_eq!(config.advisor_count(), 1);
    }

    #[test]
    fn test_interfaces() {
        let config = ProxyConfig::new();
        config.add_interface(greeter()).unwrap();
        config.add_interface(greeter()).unwrap();
        assert_eq!(config.proxied_interfaces().len(), 1);
        assert!(config.is_interface_proxied("Greeter"));
        assert!(!config.is_interface_proxied("Greet"));
        assert!(config.remove_interface("Greeter").unwrap());
        assert!(!config.is_interface_proxied("Greeter"));
    }

    #[test]
    fn test_introduction_adds_and_removes_capabilities() {
        let lockable = Capability::builder("Lockable").method("lock").build();
        let advisor = Advisor::introduction(
            passthrough(),
            vec![lockable],
            Arc::new(crate::matching::AnyClass),
        );
        let config = ProxyConfig::new();
        config.add_advisor(advisor.clone()).unwrap();
        assert!(config.is_interface_proxied("Lockable"));
        config.remove_advisor(&advisor).unwrap();
        assert!(!config.is_interface_proxied("Lockable"));
    }

    #[test]
    fn test_chain_cache_invalidated_on_change() {
        let ty = TypeInfo::builder("Svc").method("run").build();
        let method = ty.find_method("run").unwrap();
        let config = ProxyConfig::new();
        config
            .add_advisor(Advisor::new(passthrough(), Pointcut::name_match(["run"])))
            .unwrap();

        let first = config.interceptor_chain(&method, Some(&ty));
        let again = config.interceptor_chain(&method, Some(&ty));
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first.len(), 1);

        config.add_advice(passthrough()).unwrap();
        let after = config.interceptor_chain(&method, Some(&ty));
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_settings_copy() {
        let config = ProxyConfig::new();
        let settings = ProxySettings {
            proxy_target_type: true,
            expose_proxy: true,
            ..Default::default()
        };
        config.apply_settings(&settings).unwrap();
        assert_eq!(config.settings(), settings);
        assert!(config.is_proxy_target_type());
        assert!(config.is_expose_proxy());
        assert!(!config.is_opaque());
    }

    #[test]
    fn test_listener_notified_only_after_activation() {
        let listener = Arc::new(RecordingListener::default());
        let config = Arc::new(ProxyConfig::new());
        config.add_interface(greeter()).unwrap();
        config.add_listener(listener.clone());

        config.add_advice(passthrough()).unwrap();
        assert!(listener.events.lock().is_empty());

        config.create_proxy(&crate::proxy::DefaultAopProxyFactory).unwrap();
        config.create_proxy(&crate::proxy::DefaultAopProxyFactory).unwrap();
        assert!(config.is_active());

        config.add_advice(passthrough()).unwrap();
        assert_eq!(*listener.events.lock(), vec!["activated", "changed:2"]);
    }

    /// Queries the configuration it is notified about
    #[derive(Default)]
    struct InspectingListener {
        seen: TestMutex<Vec<String>>,
    }

    impl AdvisedListener for InspectingListener {
        fn activated(&self, config: &ProxyConfig) -> Result<()> {
            let late: Arc<dyn AdvisedListener> = Arc::new(RecordingListener::default());
            config.add_listener(Arc::clone(&late));
            let removed = config.remove_listener(&late);
            self.seen.lock().push(format!(
                "activated:active={}:advisors={}:removed={}",
                config.is_active(),
                config.advisor_count(),
                removed
            ));
            Ok(())
        }

        fn advice_changed(&self, config: &ProxyConfig) {
            self.seen.lock().push(format!(
                "changed:active={}:advisors={}",
                config.is_active(),
                config.advisor_count()
            ));
        }
    }

    #[test]
    fn test_listener_may_query_config_during_callbacks() {
        let listener = Arc::new(InspectingListener::default());
        let config = Arc::new(ProxyConfig::new());
        config.add_interface(greeter()).unwrap();
        config.add_advice(passthrough()).unwrap();
        config.add_listener(listener.clone());

        config.create_proxy(&crate::proxy::DefaultAopProxyFactory).unwrap();
        config.add_advice(passthrough()).unwrap();

        assert_eq!(
            *listener.seen.lock(),
            vec![
                "activated:active=false:advisors=1:removed=true",
                "changed:active=true:advisors=2",
            ]
        );
        assert!(config.is_active());
    }

    #[test]
    fn test_refused_activation_leaves_config_inactive() {
        let listener = Arc::new(RecordingListener {
            refuse: true,
            ..Default::default()
        });
        let config = Arc::new(ProxyConfig::new());
        config.add_interface(greeter()).unwrap();
        config.add_listener(listener.clone());

        let err = config.create_proxy(&crate::proxy::DefaultAopProxyFactory).unwrap_err();
        assert!(matches!(err, EngineError::ActivationFailed(_)));
        assert!(!config.is_active());

        let as_dyn: Arc<dyn AdvisedListener> = listener;
        assert!(config.remove_listener(&as_dyn));
        config.create_proxy(&crate::proxy::DefaultAopProxyFactory).unwrap();
        assert!(config.is_active());
    }

    #[test]
    fn test_display() {
        let config = ProxyConfig::new();
        config.add_interface(greeter()).unwrap();
        config
            .add_advisor(Advisor::unconditional(passthrough()).with_name("logging"))
            .unwrap();
        let text = config.to_proxy_config_string();
        assert!(text.contains("1 interfaces [Greeter]"));
        assert!(text.contains("1 advisors [logging]"));
        assert!(text.contains("frozen=false"));
    }
}
