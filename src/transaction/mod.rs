// src/transaction/mod.rs
//! Declarative transactions on top of the interception engine
//!
//! Methods opt in through attributes on their metadata:
//!
//! | Attribute                            | Effect                              |
//! |--------------------------------------|-------------------------------------|
//! | `transactional`                      | join or start a transaction         |
//! | `transactional:read_only`            | same, flagged read-only             |
//! | `transactional:requires_new`         | always start a new transaction      |
//! | `transactional:supports`             | join if one is active               |
//! | `transactional:no_rollback_for=Text` | commit when the error mentions Text |
//!
//! - **manager**: Transaction manager trait and an in-memory implementation
//! - **interceptor**: Around advice driving begin / commit / rollback

pub mod interceptor;
pub mod manager;

use crate::meta::{Method, TypeInfo};
use serde::{Deserialize, Serialize};

pub use interceptor::{transaction_advisor, TransactionAttributeSourcePointcut, TransactionInterceptor};
pub use manager::{InMemoryTransactionManager, TransactionManager, TransactionStats, TransactionStatus};

const TRANSACTIONAL: &str = "transactional";

/// How a call relates to an already active transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Join the active transaction or start one
    #[default]
    Required,

    /// Always start a new transaction
    RequiresNew,

    /// Join the active transaction, run without one otherwise
    Supports,
}

/// Transaction settings for one method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAttribute {
    pub propagation: Propagation,
    pub read_only: bool,
    pub name: Option<String>,

    /// Errors whose message chain contains one of these commit instead of
    /// rolling back
    pub no_rollback_for: Vec<String>,
}

impl TransactionAttribute {
    pub fn required() -> Self {
        Self::default()
    }

    /// Whether `error` should roll the transaction back (default: every error)
    pub fn rollback_on(&self, error: &anyhow::Error) -> bool {
        !error.chain().any(|cause| {
            let message = cause.to_string();
            self.no_rollback_for.iter().any(|pattern| message.contains(pattern.as_str()))
        })
    }
}

/// Looks up the transaction attribute of a method
pub trait TransactionAttributeSource: Send + Sync {
    fn attribute(&self, method: &Method, target_type: Option<&TypeInfo>) -> Option<TransactionAttribute>;
}

/// Reads `transactional` attributes from method metadata
#[derive(Debug, Default, Clone, Copy)]
pub struct MethodAttributeSource;

impl TransactionAttributeSource for MethodAttributeSource {
    fn attribute(&self, method: &Method, _target_type: Option<&TypeInfo>) -> Option<TransactionAttribute> {
        let mut attribute: Option<TransactionAttribute> = None;

        for raw in method.attributes() {
            let qualifier = if raw.as_ref() == TRANSACTIONAL {
                None
            } else if let Some(rest) = raw.strip_prefix("transactional:") {
                Some(rest)
            } else {
                continue;
            };

            let attr = attribute.get_or_insert_with(|| TransactionAttribute {
                name: Some(method.to_string()),
                ..Default::default()
            });
            match qualifier {
                None => {}
                Some("read_only") => attr.read_only = true,
                Some("requires_new") => attr.propagation = Propagation::RequiresNew,
                Some("supports") => attr.propagation = Propagation::Supports,
                Some(other) => {
                    if let Some(pattern) = other.strip_prefix("no_rollback_for=") {
                        attr.no_rollback_for.push(pattern.to_string());
                    }
                }
            }
        }
        attribute
    }
}
