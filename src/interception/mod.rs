// src/interception/mod.rs
//! Invocation chain engine
//!
//! Every proxied call becomes an [`Invocation`] walking an ordered chain of
//! interceptors down to the target and back:
//!
//! - **invocation**: `proceed()` protocol, chain elements, target scoping
//! - **chain**: Selecting the advisors that apply to one method
//! - **context**: Thread-bound access to the current proxy and invocation
//!
//! # Architecture
//!
//! ```text
//! proxy.call("m", args)
//!     │
//!     ├─ chain cache (method, target type) → [I1, I2, ...]
//!     ├─ I1.invoke → proceed()
//!     │     └─ I2.invoke → proceed()
//!     │           └─ target.invoke(m, args)
//!     └─ result / error propagates back up unchanged
//! ```

pub mod chain;
pub mod context;
pub mod invocation;

pub use chain::{AdvisorChainFactory, DefaultAdvisorChainFactory, ResolvedAdvisor};
pub use context::{current_invocation, AopContext, ExposeInvocationInterceptor, InvocationSnapshot};
pub use invocation::{interceptor_fn, ChainElement, Invocation, MethodInterceptor};
