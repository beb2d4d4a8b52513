//! Khata (running credit ledger) domain module.
//!
//! Ledger balances per customer plus the lead-scoring model derived from
//! transaction history. Pure domain logic; persistence and recomputation
//! triggers live in the application layer.

pub mod lead_score;
pub mod ledger;

pub use lead_score::{lead_score, Transaction};
pub use ledger::{KhataAction, KhataEntry, LedgerBalance};
