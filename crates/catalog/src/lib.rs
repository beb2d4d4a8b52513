//! Catalog domain module.
//!
//! SKU records and the deterministic name-resolution layer: exact match
//! first, then substring containment, first candidate in stable order wins.
//! The resolver itself never mutates catalog data; its only side effect is
//! the process-lifetime resolution cache.

pub mod resolver;
pub mod sku;

pub use resolver::{best_match, ResolutionCache};
pub use sku::Sku;
