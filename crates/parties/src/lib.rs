//! Parties domain module.
//!
//! Stores, suppliers and khata customers. Records are created out-of-band
//! (onboarding) and are read-only to the event pipeline, so this crate is
//! plain records plus deterministic name matching, with no lifecycle machinery.

pub mod party;

pub use party::{match_customer_by_name, Customer, Store, Supplier};
