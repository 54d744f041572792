// src/transaction/manager.rs
//! Transaction managers

use crate::transaction::{Propagation, TransactionAttribute};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};
use tracing::debug;

/// Handle for one begin / commit-or-rollback bracket
#[derive(Debug)]
pub struct TransactionStatus {
    /// Transaction this call runs in (`None` when running without one)
    pub id: Option<u64>,

    /// Whether this bracket started the transaction
    pub new_transaction: bool,

    pub read_only: bool,
    pub name: Option<String>,
}

/// Begins, commits and rolls back transactions
pub trait TransactionManager: Send + Sync {
    fn begin(&self, attribute: &TransactionAttribute) -> anyhow::Result<TransactionStatus>;

    fn commit(&self, status: TransactionStatus) -> anyhow::Result<()>;

    fn rollback(&self, status: TransactionStatus) -> anyhow::Result<()>;
}

/// Counters kept by [`InMemoryTransactionManager`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub begun: u64,
    pub committed: u64,
    pub rolled_back: u64,
}

#[derive(Debug)]
struct Frame {
    id: u64,
    rollback_only: bool,
}

/// Transactions tracked per thread, with nesting and counters
#[derive(Debug, Default)]
pub struct InMemoryTransactionManager {
    next_id: AtomicU64,
    active: DashMap<ThreadId, Vec<Frame>>,
    begun: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
}

impl InMemoryTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> TransactionStats {
        TransactionStats {
            begun: self.begun.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
        }
    }

    /// Innermost transaction of the calling thread
    pub fn current_transaction(&self) -> Option<u64> {
        self.active
            .get(&thread::current().id())
            .and_then(|frames| frames.last().map(|f| f.id))
    }

    fn start(&self, attribute: &TransactionAttribute) -> TransactionStatus {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.active.entry(thread::current().id()).or_default().push(Frame {
            id,
            rollback_only: false,
        });
        self.begun.fetch_add(1, Ordering::Relaxed);
        debug!(tx = id, name = ?attribute.name, read_only = attribute.read_only, "Began transaction");
        TransactionStatus {
            id: Some(id),
            new_transaction: true,
            read_only: attribute.read_only,
            name: attribute.name.clone(),
        }
    }

    /// Pop the frame of `id`, returning whether it was marked rollback-only
    fn finish(&self, id: u64) -> anyhow::Result<bool> {
        let thread = thread::current().id();
        let mut frames = self
            .active
            .get_mut(&thread)
            .ok_or_else(|| anyhow::anyhow!("No active transaction on this thread"))?;
        match frames.last() {
            Some(frame) if frame.id == id => {}
            _ => anyhow::bail!("Transaction {id} is not the innermost active transaction"),
        }
        let rollback_only = frames.pop().map_or(false, |f| f.rollback_only);
        let empty = frames.is_empty();
        drop(frames);
        if empty {
            self.active.remove_if(&thread, |_, frames| frames.is_empty());
        }
        Ok(rollback_only)
    }
}

impl TransactionManager for InMemoryTransactionManager {
    fn begin(&self, attribute: &TransactionAttribute) -> anyhow::Result<TransactionStatus> {
        let current = self.current_transaction();
        match (attribute.propagation, current) {
            (Propagation::RequiresNew, _) | (Propagation::Required, None) => Ok(self.start(attribute)),
            (_, joined) => Ok(TransactionStatus {
                id: joined,
                new_transaction: false,
                read_only: attribute.read_only,
                name: attribute.name.clone(),
            }),
        }
    }

    fn commit(&self, status: TransactionStatus) -> anyhow::Result<()> {
        let Some(id) = status.id.filter(|_| status.new_transaction) else {
            return Ok(());
        };
        if self.finish(id)? {
            self.rolled_back.fetch_add(1, Ordering::Relaxed);
            anyhow::bail!("Transaction {id} rolled back because it was marked rollback-only");
        }
        self.committed.fetch_add(1, Ordering::Relaxed);
        debug!(tx = id, "Committed transaction");
        Ok(())
    }

    fn rollback(&self, status: TransactionStatus) -> anyhow::Result<()> {
        match (status.id, status.new_transaction) {
            (Some(id), true) => {
                self.finish(id)?;
                self.rolled_back.fetch_add(1, Ordering::Relaxed);
                debug!(tx = id, "Rolled back transaction");
            }
            (Some(id), false) => {
                // participating call: the owner of the transaction decides
                if let Some(mut frames) = self.active.get_mut(&thread::current().id()) {
                    if let Some(frame) = frames.iter_mut().rev().find(|f| f.id == id) {
                        frame.rollback_only = true;
                    }
                }
                debug!(tx = id, "Marked transaction rollback-only");
            }
            (None, _) => {}
        }
        Ok(())
    }
}
