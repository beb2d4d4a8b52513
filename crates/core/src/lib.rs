//! `dukaan-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod address;
pub mod error;
pub mod id;

pub use address::ChannelAddress;
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, LostSaleId, ReorderId, SkuId, StoreId, SupplierId, TransactionId};
