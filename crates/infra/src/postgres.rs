//! Postgres storage adapter.
//!
//! Plain row store. The one concurrency-sensitive write is
//! [`ReorderRepo::update_reorder_if`]: the status guard lives in the SQL
//! `WHERE` clause, so two racing transitions serialize on the row and the
//! loser observes zero affected rows.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use dukaan_catalog::Sku;
use dukaan_core::{ChannelAddress, CustomerId, LostSaleId, ReorderId, SkuId, StoreId, SupplierId, TransactionId};
use dukaan_demand::{DemandBreakdown, DemandSignal};
use dukaan_inventory::{InventoryRecord, LostSale};
use dukaan_khata::{LedgerBalance, Transaction};
use dukaan_negotiation::{ReorderRequest, ReorderSnapshot, ReorderStatus};
use dukaan_parties::{Customer, Store, Supplier};

use crate::repos::{
    CatalogRepo, DirectoryRepo, InventoryRepo, LedgerRepo, ReorderRepo, RepoError, RepoResult,
    SignalRepo,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stores (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    contact TEXT NOT NULL UNIQUE,
    address TEXT,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS suppliers (
    id UUID PRIMARY KEY,
    store_id UUID NOT NULL REFERENCES stores(id),
    name TEXT NOT NULL,
    contact TEXT NOT NULL,
    category TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS customers (
    id UUID PRIMARY KEY,
    store_id UUID NOT NULL REFERENCES stores(id),
    name TEXT NOT NULL,
    contact TEXT,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS skus (
    id UUID PRIMARY KEY,
    store_id UUID NOT NULL REFERENCES stores(id),
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS inventory (
    sku_id UUID PRIMARY KEY REFERENCES skus(id),
    stock_level NUMERIC NOT NULL,
    last_updated TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS lost_sales (
    id UUID PRIMARY KEY,
    store_id UUID NOT NULL REFERENCES stores(id),
    sku_id UUID REFERENCES skus(id),
    sku_name TEXT NOT NULL,
    requested_qty NUMERIC NOT NULL,
    detected_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS khata_ledgers (
    customer_id UUID PRIMARY KEY REFERENCES customers(id),
    balance NUMERIC NOT NULL,
    last_payment_at TIMESTAMPTZ,
    lead_score NUMERIC
);

CREATE TABLE IF NOT EXISTS transactions (
    id UUID PRIMARY KEY,
    customer_id UUID NOT NULL REFERENCES customers(id),
    total_amount NUMERIC NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS reorder_requests (
    id UUID PRIMARY KEY,
    store_id UUID NOT NULL REFERENCES stores(id),
    supplier_id UUID NOT NULL REFERENCES suppliers(id),
    sku_id UUID REFERENCES skus(id),
    sku_name TEXT NOT NULL,
    quantity NUMERIC NOT NULL,
    unit_price NUMERIC,
    total_amount NUMERIC,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    version BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reorder_supplier_status
    ON reorder_requests (supplier_id, status);

CREATE TABLE IF NOT EXISTS demand_signals (
    id BIGSERIAL PRIMARY KEY,
    sku_id UUID NOT NULL REFERENCES skus(id),
    score DOUBLE PRECISION NOT NULL,
    velocity DOUBLE PRECISION NOT NULL,
    lost_decayed DOUBLE PRECISION NOT NULL,
    lost_normalized DOUBLE PRECISION NOT NULL,
    seasonality DOUBLE PRECISION NOT NULL,
    computed_at TIMESTAMPTZ NOT NULL
);
"#;

/// Postgres-backed [`crate::repos::Datastore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Idempotent schema bootstrap.
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

fn corrupt(err: impl std::fmt::Display) -> RepoError {
    RepoError::Corrupt(err.to_string())
}

fn address(raw: String) -> RepoResult<ChannelAddress> {
    ChannelAddress::new(raw).map_err(corrupt)
}

fn map_store(row: &PgRow) -> RepoResult<Store> {
    Ok(Store {
        id: StoreId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        contact: address(row.try_get("contact")?)?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_supplier(row: &PgRow) -> RepoResult<Supplier> {
    Ok(Supplier {
        id: SupplierId::from_uuid(row.try_get("id")?),
        store_id: StoreId::from_uuid(row.try_get("store_id")?),
        name: row.try_get("name")?,
        contact: address(row.try_get("contact")?)?,
        category: row.try_get("category")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_customer(row: &PgRow) -> RepoResult<Customer> {
    let contact: Option<String> = row.try_get("contact")?;
    Ok(Customer {
        id: CustomerId::from_uuid(row.try_get("id")?),
        store_id: StoreId::from_uuid(row.try_get("store_id")?),
        name: row.try_get("name")?,
        contact: contact.map(address).transpose()?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_sku(row: &PgRow) -> RepoResult<Sku> {
    Ok(Sku {
        id: SkuId::from_uuid(row.try_get("id")?),
        store_id: StoreId::from_uuid(row.try_get("store_id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_ledger(row: &PgRow) -> RepoResult<LedgerBalance> {
    Ok(LedgerBalance {
        customer_id: CustomerId::from_uuid(row.try_get("customer_id")?),
        balance: row.try_get("balance")?,
        last_payment_at: row.try_get("last_payment_at")?,
        lead_score: row.try_get("lead_score")?,
    })
}

fn map_reorder(row: &PgRow) -> RepoResult<ReorderRequest> {
    let sku_id: Option<Uuid> = row.try_get("sku_id")?;
    let status: String = row.try_get("status")?;
    let version: i64 = row.try_get("version")?;

    let snapshot = ReorderSnapshot {
        id: ReorderId::from_uuid(row.try_get("id")?),
        store_id: StoreId::from_uuid(row.try_get("store_id")?),
        supplier_id: SupplierId::from_uuid(row.try_get("supplier_id")?),
        sku_id: sku_id.map(SkuId::from_uuid),
        sku_name: row.try_get("sku_name")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        total_amount: row.try_get("total_amount")?,
        status: ReorderStatus::from_str(&status).map_err(corrupt)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version: version as u64,
    };
    Ok(ReorderRequest::from_snapshot(snapshot))
}

#[async_trait]
impl DirectoryRepo for PgStore {
    async fn store_by_contact(&self, contact: &ChannelAddress) -> RepoResult<Option<Store>> {
        let row = sqlx::query("SELECT * FROM stores WHERE contact = $1")
            .bind(contact.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_store).transpose()
    }

    async fn supplier_by_contact(&self, contact: &ChannelAddress) -> RepoResult<Option<Supplier>> {
        let row = sqlx::query("SELECT * FROM suppliers WHERE contact = $1")
            .bind(contact.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_supplier).transpose()
    }

    async fn get_store(&self, id: StoreId) -> RepoResult<Option<Store>> {
        let row = sqlx::query("SELECT * FROM stores WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_store).transpose()
    }

    async fn get_supplier(&self, id: SupplierId) -> RepoResult<Option<Supplier>> {
        let row = sqlx::query("SELECT * FROM suppliers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_supplier).transpose()
    }

    async fn supplier_for_category(
        &self,
        store_id: StoreId,
        category: &str,
    ) -> RepoResult<Option<Supplier>> {
        let row = sqlx::query(
            "SELECT * FROM suppliers
             WHERE store_id = $1 AND lower(category) = lower($2)
             ORDER BY created_at ASC LIMIT 1",
        )
        .bind(store_id.as_uuid())
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_supplier).transpose()
    }

    async fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_customer).transpose()
    }

    async fn customers_for_store(&self, store_id: StoreId) -> RepoResult<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT * FROM customers WHERE store_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(store_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_customer).collect()
    }
}

#[async_trait]
impl CatalogRepo for PgStore {
    async fn skus_for_store(&self, store_id: StoreId) -> RepoResult<Vec<Sku>> {
        // Ordering by (created_at, id) reproduces insertion order; the id is
        // time-ordered (v7) so same-timestamp rows stay stable too.
        let rows =
            sqlx::query("SELECT * FROM skus WHERE store_id = $1 ORDER BY created_at ASC, id ASC")
                .bind(store_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(map_sku).collect()
    }

    async fn get_sku(&self, id: SkuId) -> RepoResult<Option<Sku>> {
        let row = sqlx::query("SELECT * FROM skus WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_sku).transpose()
    }
}

#[async_trait]
impl InventoryRepo for PgStore {
    async fn inventory_for_sku(&self, sku_id: SkuId) -> RepoResult<Option<InventoryRecord>> {
        let row = sqlx::query("SELECT * FROM inventory WHERE sku_id = $1")
            .bind(sku_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| {
            Ok(InventoryRecord {
                sku_id,
                stock_level: row.try_get("stock_level")?,
                last_updated: row.try_get("last_updated")?,
            })
        })
        .transpose()
    }

    async fn upsert_inventory(&self, record: &InventoryRecord) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO inventory (sku_id, stock_level, last_updated)
             VALUES ($1, $2, $3)
             ON CONFLICT (sku_id)
             DO UPDATE SET stock_level = $2, last_updated = $3",
        )
        .bind(record.sku_id.as_uuid())
        .bind(record.stock_level)
        .bind(record.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_lost_sale(&self, lost_sale: &LostSale) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO lost_sales (id, store_id, sku_id, sku_name, requested_qty, detected_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(lost_sale.id.as_uuid())
        .bind(lost_sale.store_id.as_uuid())
        .bind(lost_sale.sku_id.map(Uuid::from))
        .bind(&lost_sale.sku_name)
        .bind(lost_sale.requested_qty)
        .bind(lost_sale.detected_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn lost_sales_for_sku(&self, sku_id: SkuId) -> RepoResult<Vec<LostSale>> {
        let rows =
            sqlx::query("SELECT * FROM lost_sales WHERE sku_id = $1 ORDER BY detected_at ASC")
                .bind(sku_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;
        rows.iter()
            .map(|row| {
                Ok(LostSale {
                    id: LostSaleId::from_uuid(row.try_get("id")?),
                    store_id: StoreId::from_uuid(row.try_get("store_id")?),
                    sku_id: Some(sku_id),
                    sku_name: row.try_get("sku_name")?,
                    requested_qty: row.try_get("requested_qty")?,
                    detected_at: row.try_get("detected_at")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl LedgerRepo for PgStore {
    async fn ledger_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Option<LedgerBalance>> {
        let row = sqlx::query("SELECT * FROM khata_ledgers WHERE customer_id = $1")
            .bind(customer_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_ledger).transpose()
    }

    async fn upsert_ledger(&self, ledger: &LedgerBalance) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO khata_ledgers (customer_id, balance, last_payment_at, lead_score)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (customer_id)
             DO UPDATE SET balance = $2, last_payment_at = $3, lead_score = $4",
        )
        .bind(ledger.customer_id.as_uuid())
        .bind(ledger.balance)
        .bind(ledger.last_payment_at)
        .bind(ledger.lead_score)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn transactions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Vec<Transaction>> {
        let rows =
            sqlx::query("SELECT * FROM transactions WHERE customer_id = $1 ORDER BY created_at ASC")
                .bind(customer_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;
        rows.iter()
            .map(|row| {
                Ok(Transaction {
                    id: TransactionId::from_uuid(row.try_get("id")?),
                    customer_id,
                    total_amount: row.try_get("total_amount")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn overdue_ledgers(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<LedgerBalance>> {
        let rows = sqlx::query(
            "SELECT * FROM khata_ledgers
             WHERE balance > 0 AND (last_payment_at IS NULL OR last_payment_at < $1)",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_ledger).collect()
    }
}

#[async_trait]
impl ReorderRepo for PgStore {
    async fn insert_reorder(&self, request: &ReorderRequest) -> RepoResult<()> {
        let snapshot = request.to_snapshot().map_err(corrupt)?;
        sqlx::query(
            "INSERT INTO reorder_requests
                 (id, store_id, supplier_id, sku_id, sku_name, quantity,
                  unit_price, total_amount, status, created_at, updated_at, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(snapshot.id.as_uuid())
        .bind(snapshot.store_id.as_uuid())
        .bind(snapshot.supplier_id.as_uuid())
        .bind(snapshot.sku_id.map(Uuid::from))
        .bind(&snapshot.sku_name)
        .bind(snapshot.quantity)
        .bind(snapshot.unit_price)
        .bind(snapshot.total_amount)
        .bind(snapshot.status.to_string())
        .bind(snapshot.created_at)
        .bind(snapshot.updated_at)
        .bind(snapshot.version as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_reorder(&self, id: ReorderId) -> RepoResult<Option<ReorderRequest>> {
        let row = sqlx::query("SELECT * FROM reorder_requests WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_reorder).transpose()
    }

    async fn active_reorder_for(
        &self,
        supplier_id: SupplierId,
        sku_name: &str,
    ) -> RepoResult<Option<ReorderRequest>> {
        let row = sqlx::query(
            "SELECT * FROM reorder_requests
             WHERE supplier_id = $1
               AND lower(sku_name) = lower($2)
               AND status IN ('pending', 'pending_price')
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(supplier_id.as_uuid())
        .bind(sku_name)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_reorder).transpose()
    }

    async fn awaiting_price_from(
        &self,
        supplier_id: SupplierId,
    ) -> RepoResult<Option<ReorderRequest>> {
        let row = sqlx::query(
            "SELECT * FROM reorder_requests
             WHERE supplier_id = $1 AND status = 'pending_price'
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(supplier_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_reorder).transpose()
    }

    async fn last_agreed_price(
        &self,
        supplier_id: SupplierId,
        sku_name: &str,
    ) -> RepoResult<Option<Decimal>> {
        let row = sqlx::query(
            "SELECT unit_price FROM reorder_requests
             WHERE supplier_id = $1
               AND lower(sku_name) = lower($2)
               AND unit_price IS NOT NULL
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(supplier_id.as_uuid())
        .bind(sku_name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| row.try_get("unit_price").map_err(RepoError::from))
            .transpose()
    }

    async fn update_reorder_if(
        &self,
        updated: &ReorderRequest,
        allowed_from: &[ReorderStatus],
    ) -> RepoResult<bool> {
        let snapshot = updated.to_snapshot().map_err(corrupt)?;
        let allowed: Vec<String> = allowed_from.iter().map(|s| s.to_string()).collect();

        let result = sqlx::query(
            "UPDATE reorder_requests
             SET sku_id = $2, sku_name = $3, quantity = $4, unit_price = $5,
                 total_amount = $6, status = $7, updated_at = $8, version = $9
             WHERE id = $1 AND status = ANY($10)",
        )
        .bind(snapshot.id.as_uuid())
        .bind(snapshot.sku_id.map(Uuid::from))
        .bind(&snapshot.sku_name)
        .bind(snapshot.quantity)
        .bind(snapshot.unit_price)
        .bind(snapshot.total_amount)
        .bind(snapshot.status.to_string())
        .bind(snapshot.updated_at)
        .bind(snapshot.version as i64)
        .bind(&allowed)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl SignalRepo for PgStore {
    async fn append_signal(&self, signal: &DemandSignal) -> RepoResult<()> {
        let DemandBreakdown {
            velocity,
            lost_decayed,
            lost_normalized,
            seasonality,
        } = signal.breakdown;
        sqlx::query(
            "INSERT INTO demand_signals
                 (sku_id, score, velocity, lost_decayed, lost_normalized, seasonality, computed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(signal.sku_id.as_uuid())
        .bind(signal.score)
        .bind(velocity)
        .bind(lost_decayed)
        .bind(lost_normalized)
        .bind(seasonality)
        .bind(signal.computed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
