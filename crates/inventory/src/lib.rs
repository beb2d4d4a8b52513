//! Inventory domain module.
//!
//! Stock records and append-only lost-sale events, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod stock;

pub use stock::{InventoryRecord, LostSale};
