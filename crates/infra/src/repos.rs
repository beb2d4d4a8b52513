//! Storage contracts the application layer is wired against.
//!
//! The domain crates stay IO-free; everything that touches rows lives behind
//! these traits. Two implementations exist: [`crate::memory::InMemoryStore`]
//! for tests/dev and [`crate::postgres::PgStore`] for deployment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use dukaan_catalog::Sku;
use dukaan_core::{
    ChannelAddress, CustomerId, ReorderId, SkuId, StoreId, SupplierId,
};
use dukaan_demand::DemandSignal;
use dukaan_inventory::{InventoryRecord, LostSale};
use dukaan_khata::{LedgerBalance, Transaction};
use dukaan_negotiation::{ReorderRequest, ReorderStatus};
use dukaan_parties::{Customer, Store, Supplier};

/// Storage-level failure. These are infrastructure faults, not domain
/// rejections; domain rejections stay `DomainError`.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Unavailable(err.to_string())
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Lookup of the parties a channel address can belong to.
#[async_trait]
pub trait DirectoryRepo: Send + Sync {
    async fn store_by_contact(&self, contact: &ChannelAddress) -> RepoResult<Option<Store>>;

    async fn supplier_by_contact(&self, contact: &ChannelAddress) -> RepoResult<Option<Supplier>>;

    async fn get_store(&self, id: StoreId) -> RepoResult<Option<Store>>;

    async fn get_supplier(&self, id: SupplierId) -> RepoResult<Option<Supplier>>;

    /// First supplier of the store carrying the given category.
    async fn supplier_for_category(
        &self,
        store_id: StoreId,
        category: &str,
    ) -> RepoResult<Option<Supplier>>;

    async fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;

    async fn customers_for_store(&self, store_id: StoreId) -> RepoResult<Vec<Customer>>;
}

/// Product catalog per store.
#[async_trait]
pub trait CatalogRepo: Send + Sync {
    /// All SKUs of the store in insertion order. Fuzzy resolution depends on
    /// this order being stable so ties break the same way every call.
    async fn skus_for_store(&self, store_id: StoreId) -> RepoResult<Vec<Sku>>;

    async fn get_sku(&self, id: SkuId) -> RepoResult<Option<Sku>>;
}

/// Stock levels and the lost-sale log.
#[async_trait]
pub trait InventoryRepo: Send + Sync {
    async fn inventory_for_sku(&self, sku_id: SkuId) -> RepoResult<Option<InventoryRecord>>;

    async fn upsert_inventory(&self, record: &InventoryRecord) -> RepoResult<()>;

    /// Lost sales are append-only; there is no update or delete.
    async fn append_lost_sale(&self, lost_sale: &LostSale) -> RepoResult<()>;

    async fn lost_sales_for_sku(&self, sku_id: SkuId) -> RepoResult<Vec<LostSale>>;
}

/// Customer credit ledgers and purchase history.
#[async_trait]
pub trait LedgerRepo: Send + Sync {
    async fn ledger_for_customer(&self, customer_id: CustomerId)
        -> RepoResult<Option<LedgerBalance>>;

    async fn upsert_ledger(&self, ledger: &LedgerBalance) -> RepoResult<()>;

    async fn transactions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Vec<Transaction>>;

    /// Ledgers with a positive balance whose last payment predates `cutoff`
    /// (or never happened). Feeds the reminder sweep.
    async fn overdue_ledgers(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<LedgerBalance>>;
}

/// Reorder request rows.
#[async_trait]
pub trait ReorderRepo: Send + Sync {
    async fn insert_reorder(&self, request: &ReorderRequest) -> RepoResult<()>;

    async fn get_reorder(&self, id: ReorderId) -> RepoResult<Option<ReorderRequest>>;

    /// The single non-terminal request for a (supplier, item name) pair, if
    /// one exists. Item names compare case-insensitively.
    async fn active_reorder_for(
        &self,
        supplier_id: SupplierId,
        sku_name: &str,
    ) -> RepoResult<Option<ReorderRequest>>;

    /// Most recently created request that is waiting on a price from this
    /// supplier. A free-text supplier reply is routed to this request.
    async fn awaiting_price_from(
        &self,
        supplier_id: SupplierId,
    ) -> RepoResult<Option<ReorderRequest>>;

    /// Unit price of the supplier's most recent priced request for the item.
    async fn last_agreed_price(
        &self,
        supplier_id: SupplierId,
        sku_name: &str,
    ) -> RepoResult<Option<Decimal>>;

    /// Conditional write: persist `updated` only while the stored status is
    /// still in `allowed_from`. Returns whether a row was written; `false`
    /// means a concurrent/duplicate event already moved the request and the
    /// caller must treat its own transition as stale.
    async fn update_reorder_if(
        &self,
        updated: &ReorderRequest,
        allowed_from: &[ReorderStatus],
    ) -> RepoResult<bool>;
}

/// Append-only demand signal history.
#[async_trait]
pub trait SignalRepo: Send + Sync {
    async fn append_signal(&self, signal: &DemandSignal) -> RepoResult<()>;
}

/// Everything the application layer needs from storage, as one object-safe
/// bound.
pub trait Datastore:
    DirectoryRepo + CatalogRepo + InventoryRepo + LedgerRepo + ReorderRepo + SignalRepo
{
}

impl<T> Datastore for T where
    T: DirectoryRepo + CatalogRepo + InventoryRepo + LedgerRepo + ReorderRepo + SignalRepo
{
}
