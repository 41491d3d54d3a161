//! Linen order linkage: bill-of-materials computation and the resolver that
//! keeps one order bound to each active cleaning.

pub mod manifest;
pub mod resolver;

pub use manifest::{fallback_manifest, manifest_for};
pub use resolver::{OrderLinkageResolver, OrderResolution};
