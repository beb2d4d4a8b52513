//! Reorder negotiation domain module.
//!
//! Owns the reorder-request lifecycle: creation, price negotiation,
//! approval/decline, bill generation. All transitions go through one guarded
//! `handle` entry point so no call site can bypass the transition table.
//! Pure domain logic; serialization of concurrent mutations is the storage
//! layer's conditional update.

pub mod invoice;
pub mod reorder;

pub use invoice::InvoiceView;
pub use reorder::{
    Approve, Create, Decline, GenerateBill, ReorderCommand, ReorderEvent, ReorderRequest,
    ReorderSnapshot, ReorderStatus, RequestPriceUpdate, SubmitPrice,
};
