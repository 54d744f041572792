// src/transaction/interceptor.rs
//! Transaction interceptor and advisor

use crate::advice::{Advice, Advisor};
use crate::interception::{Invocation, MethodInterceptor};
use crate::matching::{MethodMatcher, Pointcut};
use crate::meta::{Method, TypeInfo};
use crate::target::Value;
use crate::transaction::{TransactionAttributeSource, TransactionManager};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Around advice: begin, proceed, then commit or roll back
pub struct TransactionInterceptor {
    manager: Arc<dyn TransactionManager>,
    source: Arc<dyn TransactionAttributeSource>,
}

impl TransactionInterceptor {
    pub fn new(manager: Arc<dyn TransactionManager>, source: Arc<dyn TransactionAttributeSource>) -> Self {
        Self { manager, source }
    }
}

impl MethodInterceptor for TransactionInterceptor {
    fn invoke(&self, invocation: &mut Invocation) -> anyhow::Result<Value> {
        let attribute = match self
            .source
            .attribute(invocation.method(), invocation.target_type().map(|t| t.as_ref()))
        {
            Some(attribute) => attribute,
            None => return invocation.proceed(),
        };

        let status = self.manager.begin(&attribute)?;
        match invocation.proceed() {
            Ok(value) => {
                self.manager.commit(status)?;
                Ok(value)
            }
            Err(err) => {
                let outcome = if attribute.rollback_on(&err) {
                    self.manager.rollback(status)
                } else {
                    self.manager.commit(status)
                };
                if let Err(secondary) = outcome {
                    warn!(
                        method = %invocation.method(),
                        error = %secondary,
                        "Transaction completion failed after call error"
                    );
                }
                Err(err)
            }
        }
    }
}

/// Matches methods that carry a transaction attribute
pub struct TransactionAttributeSourcePointcut {
    source: Arc<dyn TransactionAttributeSource>,
}

impl TransactionAttributeSourcePointcut {
    pub fn new(source: Arc<dyn TransactionAttributeSource>) -> Self {
        Self { source }
    }
}

impl fmt::Debug for TransactionAttributeSourcePointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransactionAttributeSourcePointcut")
    }
}

impl MethodMatcher for TransactionAttributeSourcePointcut {
    fn matches(&self, method: &Method, target_type: Option<&TypeInfo>) -> bool {
        self.source.attribute(method, target_type).is_some()
    }
}

/// Advisor applying transactions to every method with an attribute
pub fn transaction_advisor(
    manager: Arc<dyn TransactionManager>,
    source: Arc<dyn TransactionAttributeSource>,
) -> Advisor {
    let pointcut = Pointcut::for_method_matcher(Arc::new(TransactionAttributeSourcePointcut::new(
        Arc::clone(&source),
    )));
    Advisor::new(
        Advice::interceptor(TransactionInterceptor::new(manager, source)),
        pointcut,
    )
    .with_name("transaction")
}
