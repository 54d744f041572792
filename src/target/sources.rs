// src/target/sources.rs
//! Standard target sources

use crate::meta::TypeInfo;
use crate::target::{Target, TargetSource};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Fixed target instance; the common case
pub struct SingletonTargetSource {
    target: Arc<dyn Target>,
}

impl SingletonTargetSource {
    pub fn new(target: Arc<dyn Target>) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }
}

impl TargetSource for SingletonTargetSource {
    fn target_type(&self) -> Option<Arc<TypeInfo>> {
        Some(self.target.type_info())
    }

    fn is_static(&self) -> bool {
        true
    }

    fn get_target(&self) -> anyhow::Result<Option<Arc<dyn Target>>> {
        Ok(Some(Arc::clone(&self.target)))
    }
}

/// No target at all: every call must be answered by an interceptor
#[derive(Default)]
pub struct EmptyTargetSource {
    target_type: Option<Arc<TypeInfo>>,
}

impl EmptyTargetSource {
    pub fn new() -> Self {
        Self { target_type: None }
    }

    /// Empty source that still reports a type for class filters
    pub fn for_type(target_type: Arc<TypeInfo>) -> Self {
        Self {
            target_type: Some(target_type),
        }
    }
}

impl TargetSource for EmptyTargetSource {
    fn target_type(&self) -> Option<Arc<TypeInfo>> {
        self.target_type.clone()
    }

    fn is_static(&self) -> bool {
        true
    }

    fn get_target(&self) -> anyhow::Result<Option<Arc<dyn Target>>> {
        Ok(None)
    }
}

type Factory = Box<dyn Fn() -> anyhow::Result<Arc<dyn Target>> + Send + Sync>;

/// Fresh target per call
pub struct PrototypeTargetSource {
    target_type: Arc<TypeInfo>,
    factory: Factory,
}

impl PrototypeTargetSource {
    pub fn new<F>(target_type: Arc<TypeInfo>, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn Target>> + Send + Sync + 'static,
    {
        Self {
            target_type,
            factory: Box::new(factory),
        }
    }
}

impl TargetSource for PrototypeTargetSource {
    fn target_type(&self) -> Option<Arc<TypeInfo>> {
        Some(Arc::clone(&self.target_type))
    }

    fn is_static(&self) -> bool {
        false
    }

    fn get_target(&self) -> anyhow::Result<Option<Arc<dyn Target>>> {
        let target = (self.factory)()?;
        debug!("Created prototype target of type {}", self.target_type);
        Ok(Some(target))
    }
}

/// Target that can be replaced while proxies keep pointing at the source
pub struct HotSwappableTargetSource {
    target: RwLock<Arc<dyn Target>>,
}

impl HotSwappableTargetSource {
    pub fn new(target: Arc<dyn Target>) -> Self {
        Self {
            target: RwLock::new(target),
        }
    }

    /// Replace the target, returning the previous one
    pub fn swap(&self, new_target: Arc<dyn Target>) -> Arc<dyn Target> {
        let mut guard = self.target.write();
        debug!(
            "Swapping target {} for {}",
            guard.type_info(),
            new_target.type_info()
        );
        std::mem::replace(&mut *guard, new_target)
    }
}

impl TargetSource for HotSwappableTargetSource {
    fn target_type(&self) -> Option<Arc<TypeInfo>> {
        Some(self.target.read().type_info())
    }

    fn is_static(&self) -> bool {
        false
    }

    fn get_target(&self) -> anyhow::Result<Option<Arc<dyn Target>>> {
        Ok(Some(Arc::clone(&*self.target.read())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Method;
    use crate::target::DispatchTarget;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn constant_target(name: &str, value: &'static str) -> Arc<dyn Target> {
        let ty = TypeInfo::builder(name).method("value").build();
        DispatchTarget::builder(ty)
            .on("value", move |_| Ok(json!(value)))
            .build()
    }

    #[test]
    fn test_singleton_is_static() {
        let source = SingletonTargetSource::new(constant_target("A", "a"));
        assert!(source.is_static());
        assert_eq!(source.target_type().unwrap().name(), "A");
        let t1 = source.get_target().unwrap().unwrap();
        let t2 = source.get_target().unwrap().unwrap();
        assert!(Arc::ptr_eq(&t1, &t2));
    }

    #[test]
    fn test_empty_source() {
        let source = EmptyTargetSource::new();
        assert!(source.get_target().unwrap().is_none());
        assert!(source.target_type().is_none());

        let typed = EmptyTargetSource::for_type(TypeInfo::builder("T").build());
        assert_eq!(typed.target_type().unwrap().name(), "T");
    }

    #[test]
    fn test_prototype_creates_per_call() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let source = PrototypeTargetSource::new(TypeInfo::builder("P").build(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(constant_target("P", "p"))
        });

        assert!(!source.is_static());
        source.get_target().unwrap();
        source.get_target().unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_hot_swap() {
        let source = HotSwappableTargetSource::new(constant_target("A", "a"));
        let method = Method::new("A", "value");

        let before = source.get_target().unwrap().unwrap();
        assert_eq!(before.invoke(&method, &[]).unwrap(), json!("a"));

        let old = source.swap(constant_target("B", "b"));
        assert_eq!(old.type_info().name(), "A");

        let after = source.get_target().unwrap().unwrap();
        assert_eq!(after.invoke(&method, &[]).unwrap(), json!("b"));
        assert_eq!(source.target_type().unwrap().name(), "B");
    }
}
