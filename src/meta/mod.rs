// src/meta/mod.rs
//! Type metadata consumed by matchers and proxy construction
//!
//! - **type_info**: `Method`, `Capability`, `TypeInfo` and their builders
//! - **well_known**: Lifecycle, proxy-machinery, and infrastructure capabilities

pub mod type_info;
pub mod well_known;

pub use type_info::{Capability, CapabilityBuilder, Method, TypeInfo, TypeInfoBuilder};
