// src/target/pool.rs
//! Pooled target source
//!
//! Keeps a bounded set of reusable targets. Each proxied call borrows one
//! instance for the duration of the terminal call and hands it back
//! afterwards.
//!
//! # Architecture
//!
//! ```text
//! PooledTargetSource
//! ├─ Idle: [Target1, Target2, ...]   (ready for reuse)
//! ├─ Active: n                       (borrowed by in-flight calls)
//! └─ Waiters                         (blocked until a release)
//! ```

use crate::meta::TypeInfo;
use crate::target::{Target, TargetSource};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tracing::{debug, trace};

type Factory = Box<dyn Fn() -> anyhow::Result<Arc<dyn Target>> + Send + Sync>;

/// Configuration for the target pool
#[derive(Debug, Clone)]
pub struct PooledTargetSourceConfig {
    /// Maximum number of live targets (default: 8)
    pub max_size: usize,

    /// Targets created eagerly at construction (default: 0)
    pub min_idle: usize,
}

impl Default for PooledTargetSourceConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            min_idle: 0,
        }
    }
}

struct PoolState {
    idle: Vec<Arc<dyn Target>>,
    created: usize,
    active: usize,
}

/// Bounded pool of targets, acquired per call
pub struct PooledTargetSource {
    config: PooledTargetSourceConfig,
    target_type: Arc<TypeInfo>,
    factory: Factory,
    state: Mutex<PoolState>,
    available: Condvar,
}

impl PooledTargetSource {
    /// Create a pool, pre-creating `min_idle` targets
    pub fn new<F>(
        config: PooledTargetSourceConfig,
        target_type: Arc<TypeInfo>,
        factory: F,
    ) -> anyhow::Result<Self>
    where
        F: Fn() -> anyhow::Result<Arc<dyn Target>> + Send + Sync + 'static,
    {
        let warm = config.min_idle.min(config.max_size);
        let mut idle = Vec::with_capacity(config.max_size);
        for _ in 0..warm {
            idle.push(factory()?);
        }

        debug!(
            "Target pool for {} initialized with {} of {} targets",
            target_type, warm, config.max_size
        );

        Ok(Self {
            config,
            target_type,
            factory: Box::new(factory),
            state: Mutex::new(PoolState {
                idle,
                created: warm,
                active: 0,
            }),
            available: Condvar::new(),
        })
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            max_size: self.config.max_size,
            created: state.created,
            idle: state.idle.len(),
            active: state.active,
        }
    }
}

impl TargetSource for PooledTargetSource {
    fn target_type(&self) -> Option<Arc<TypeInfo>> {
        Some(Arc::clone(&self.target_type))
    }

    fn is_static(&self) -> bool {
        false
    }

    /// Borrow a target, blocking while all `max_size` targets are active
    fn get_target(&self) -> anyhow::Result<Option<Arc<dyn Target>>> {
        let mut state = self.state.lock();
        loop {
            if let Some(target) = state.idle.pop() {
                state.active += 1;
                trace!("Borrowed pooled {} ({} active)", self.target_type, state.active);
                return Ok(Some(target));
            }

            if state.created < self.config.max_size {
                // Reserve the slot before creating outside the lock
                state.created += 1;
                state.active += 1;
                drop(state);

                return match (self.factory)() {
                    Ok(target) => Ok(Some(target)),
                    Err(e) => {
                        let mut state = self.state.lock();
                        state.created -= 1;
                        state.active -= 1;
                        self.available.notify_one();
                        Err(e)
                    }
                };
            }

            trace!("Target pool for {} exhausted, waiting", self.target_type);
            self.available.wait(&mut state);
        }
    }

    fn release_target(&self, target: Arc<dyn Target>) -> anyhow::Result<()> {
        let mut state = self.state.lock();
        state.active = state.active.saturating_sub(1);
        state.idle.push(target);
        trace!("Returned pooled {} ({} active)", self.target_type, state.active);
        self.available.notify_one();
        Ok(())
    }
}

/// Pool statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub max_size: usize,
    pub created: usize,
    pub idle: usize,
    pub active: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::DispatchTarget;
    use serde_json::json;
    use std::thread;
    use std::time::Duration;

    fn worker_type() -> Arc<TypeInfo> {
        TypeInfo::builder("Worker").method("work").build()
    }

    fn pool(max_size: usize, min_idle: usize) -> PooledTargetSource {
        let ty = worker_type();
        let factory_type = Arc::clone(&ty);
        PooledTargetSource::new(
            PooledTargetSourceConfig { max_size, min_idle },
            ty,
            move || {
                let target: Arc<dyn Target> = DispatchTarget::builder(Arc::clone(&factory_type))
                    .on("work", |_| Ok(json!("done")))
                    .build();
                Ok(target)
            },
        )
        .unwrap()
    }

    #[test]
    fn test_pool_creation() {
        let pool = pool(4, 2);
        let stats = pool.stats();
        assert_eq!(stats.max_size, 4);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.idle, 2);
        assert_eq!(stats.active, 0);
        assert!(!pool.is_static());
    }

    #[test]
    fn test_acquire_release() {
        let pool = pool(2, 0);

        let target = pool.get_target().unwrap().unwrap();
        assert_eq!(pool.stats().active, 1);
        assert_eq!(pool.stats().created, 1);

        pool.release_target(target).unwrap();
        let stats = pool.stats();
        assert_eq!(stats.active, 0);
        assert_eq!(stats.idle, 1);

        // Reuses the idle instance rather than creating another
        let _again = pool.get_target().unwrap().unwrap();
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn test_blocks_until_release() {
        let pool = Arc::new(pool(1, 0));
        let held = pool.get_target().unwrap().unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let target = pool.get_target().unwrap().unwrap();
                pool.release_target(target).unwrap();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(pool.stats().active, 1);
        pool.release_target(held).unwrap();

        waiter.join().unwrap();
        let stats = pool.stats();
        assert_eq!(stats.active, 0);
        assert_eq!(stats.created, 1);
    }

    #[test]
    fn test_factory_failure_frees_slot() {
        let pool = PooledTargetSource::new(
            PooledTargetSourceConfig { max_size: 1, min_idle: 0 },
            worker_type(),
            || Err(anyhow::anyhow!("cannot create worker")),
        )
        .unwrap();

        assert!(pool.get_target().is_err());
        let stats = pool.stats();
        assert_eq!(stats.created, 0);
        assert_eq!(stats.active, 0);
    }
}
