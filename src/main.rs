// src/main.rs
//! Sentra Weave demo
//!
//! Wires an order service through the auto-proxy creator with a logging
//! interceptor and declarative transactions, then drives a few calls.

use anyhow::Result;
use sentra_weave::advice::Advice;
use sentra_weave::autoproxy::AutoProxyCreator;
use sentra_weave::matching::Pointcut;
use sentra_weave::meta::{Capability, TypeInfo};
use sentra_weave::observability::{init_metrics, init_tracing};
use sentra_weave::proxy::Proxy;
use sentra_weave::target::{DispatchTarget, Target};
use sentra_weave::transaction::{transaction_advisor, InMemoryTransactionManager, MethodAttributeSource};
use sentra_weave::utils::config::EngineConfig;
use sentra_weave::{Advisor, BuildInfo};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

fn order_service() -> Arc<dyn Target> {
    let api = Capability::builder("OrderService")
        .method_with_attributes("place_order", &["transactional", "logged"])
        .method_with_attributes("find_order", &["transactional:read_only", "logged"])
        .method_with_attributes("cancel_order", &["transactional", "logged"])
        .method("health")
        .build();
    let ty = TypeInfo::builder("DefaultOrderService").implements(api).build();

    DispatchTarget::builder(ty)
        .on("place_order", |args| {
            let item = args.first().cloned().unwrap_or_default();
            Ok(json!({ "id": "o-1001", "item": item, "status": "placed" }))
        })
        .on("find_order", |args| {
            Ok(json!({ "id": args.first().cloned().unwrap_or_default(), "status": "placed" }))
        })
        .on("cancel_order", |args| {
            anyhow::bail!("order {} already shipped", args.first().cloned().unwrap_or_default())
        })
        .on("health", |_| Ok(json!("ok")))
        .build()
}

fn main() -> Result<()> {
    let config = EngineConfig::load()?;

    // Initialize observability (tracing, metrics, logging)
    init_tracing(&config.observability)?;
    let metrics = if config.observability.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let build = BuildInfo::current();
    info!(
        "Starting Sentra Weave v{} ({}, {})",
        build.version, build.git_hash, build.rustc_version
    );
    info!("Configuration loaded: {:?}", config);

    let creator = AutoProxyCreator::from_config(&config);

    let logging = Advisor::new(
        Advice::around(|invocation| {
            let method = invocation.method().to_string();
            let started = Instant::now();
            let result = invocation.proceed();
            match &result {
                Ok(_) => info!(%method, elapsed = ?started.elapsed(), "Call completed"),
                Err(e) => warn!(%method, error = %e, "Call failed"),
            }
            result
        }),
        Pointcut::attribute("logged"),
    )
    .with_name("logging")
    .with_order(0);
    creator.add_advisor(logging)?;

    let transactions = Arc::new(InMemoryTransactionManager::new());
    creator.add_advisor(
        transaction_advisor(transactions.clone(), Arc::new(MethodAttributeSource)).with_order(10),
    )?;

    let service = creator.after_initialization(order_service(), "orderService")?;
    let proxy = service
        .as_any()
        .downcast_ref::<Proxy>()
        .ok_or_else(|| anyhow::anyhow!("orderService was not proxied"))?;
    info!(proxy = %proxy.proxy_type(), shape = proxy.shape().label(), "Order service proxied");

    let placed = proxy.call("place_order", vec![json!("keyboard")])?;
    info!("place_order -> {}", placed);

    let found = proxy.call("find_order", vec![json!("o-1001")])?;
    info!("find_order -> {}", found);

    if let Err(e) = proxy.call("cancel_order", vec![json!("o-1001")]) {
        info!("cancel_order rejected: {}", e);
    }

    info!("health -> {}", proxy.call("health", vec![])?);

    let stats = transactions.stats();
    info!(
        begun = stats.begun,
        committed = stats.committed,
        rolled_back = stats.rolled_back,
        "Transaction summary"
    );

    if let Some(handle) = metrics {
        info!("Metrics snapshot:\n{}", handle.render());
    }

    Ok(())
}
