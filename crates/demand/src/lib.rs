//! `dukaan-demand`
//!
//! **Responsibility:** derived demand signals for restocking decisions.
//!
//! This crate is intentionally **not** part of the transactional domain:
//! - It must not mutate inventory or negotiation state.
//! - It only reads history (lost sales, pluggable velocity/seasonality).
//! - It emits **signal records**, not domain events.

pub mod score;

pub use score::{
    DemandBreakdown, DemandModel, DemandScore, DemandSignal, DemandWeights, LostSaleSample,
    DEFAULT_ALERT_THRESHOLD,
};
