//! In-memory storage adapter for tests and local development.
//!
//! One `RwLock` over the whole state. That is deliberate: the conditional
//! reorder write must read the stored status and replace the row as one
//! atomic step, and a single write lock gives exactly that.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use dukaan_catalog::Sku;
use dukaan_core::{ChannelAddress, CustomerId, ReorderId, SkuId, StoreId, SupplierId};
use dukaan_demand::DemandSignal;
use dukaan_inventory::{InventoryRecord, LostSale};
use dukaan_khata::{LedgerBalance, Transaction};
use dukaan_negotiation::{ReorderRequest, ReorderStatus};
use dukaan_parties::{Customer, Store, Supplier};

use crate::repos::{
    CatalogRepo, DirectoryRepo, InventoryRepo, LedgerRepo, ReorderRepo, RepoError, RepoResult,
    SignalRepo,
};

#[derive(Debug, Default)]
struct State {
    stores: Vec<Store>,
    suppliers: Vec<Supplier>,
    customers: Vec<Customer>,
    skus: Vec<Sku>,
    inventory: Vec<InventoryRecord>,
    lost_sales: Vec<LostSale>,
    ledgers: Vec<LedgerBalance>,
    transactions: Vec<Transaction>,
    reorders: Vec<ReorderRequest>,
    signals: Vec<DemandSignal>,
}

/// Fully in-memory [`crate::repos::Datastore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    // Seeding helpers. Deployment seeds rows out of band; tests and the dev
    // bootstrap use these.

    pub fn insert_store(&self, store: Store) {
        self.write().stores.push(store);
    }

    pub fn insert_supplier(&self, supplier: Supplier) {
        self.write().suppliers.push(supplier);
    }

    pub fn insert_customer(&self, customer: Customer) {
        self.write().customers.push(customer);
    }

    pub fn insert_sku(&self, sku: Sku) {
        self.write().skus.push(sku);
    }

    pub fn insert_transaction(&self, transaction: Transaction) {
        self.write().transactions.push(transaction);
    }

    /// Signal history, oldest first. Test observation point.
    pub fn signals(&self) -> Vec<DemandSignal> {
        self.read().signals.clone()
    }
}

#[async_trait]
impl DirectoryRepo for InMemoryStore {
    async fn store_by_contact(&self, contact: &ChannelAddress) -> RepoResult<Option<Store>> {
        Ok(self
            .read()
            .stores
            .iter()
            .find(|s| &s.contact == contact)
            .cloned())
    }

    async fn supplier_by_contact(&self, contact: &ChannelAddress) -> RepoResult<Option<Supplier>> {
        Ok(self
            .read()
            .suppliers
            .iter()
            .find(|s| &s.contact == contact)
            .cloned())
    }

    async fn get_store(&self, id: StoreId) -> RepoResult<Option<Store>> {
        Ok(self.read().stores.iter().find(|s| s.id == id).cloned())
    }

    async fn get_supplier(&self, id: SupplierId) -> RepoResult<Option<Supplier>> {
        Ok(self.read().suppliers.iter().find(|s| s.id == id).cloned())
    }

    async fn supplier_for_category(
        &self,
        store_id: StoreId,
        category: &str,
    ) -> RepoResult<Option<Supplier>> {
        Ok(self
            .read()
            .suppliers
            .iter()
            .find(|s| s.store_id == store_id && s.category.eq_ignore_ascii_case(category))
            .cloned())
    }

    async fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        Ok(self.read().customers.iter().find(|c| c.id == id).cloned())
    }

    async fn customers_for_store(&self, store_id: StoreId) -> RepoResult<Vec<Customer>> {
        Ok(self
            .read()
            .customers
            .iter()
            .filter(|c| c.store_id == store_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogRepo for InMemoryStore {
    async fn skus_for_store(&self, store_id: StoreId) -> RepoResult<Vec<Sku>> {
        Ok(self
            .read()
            .skus
            .iter()
            .filter(|s| s.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn get_sku(&self, id: SkuId) -> RepoResult<Option<Sku>> {
        Ok(self.read().skus.iter().find(|s| s.id == id).cloned())
    }
}

#[async_trait]
impl InventoryRepo for InMemoryStore {
    async fn inventory_for_sku(&self, sku_id: SkuId) -> RepoResult<Option<InventoryRecord>> {
        Ok(self
            .read()
            .inventory
            .iter()
            .find(|r| r.sku_id == sku_id)
            .cloned())
    }

    async fn upsert_inventory(&self, record: &InventoryRecord) -> RepoResult<()> {
        let mut state = self.write();
        match state.inventory.iter_mut().find(|r| r.sku_id == record.sku_id) {
            Some(existing) => *existing = record.clone(),
            None => state.inventory.push(record.clone()),
        }
        Ok(())
    }

    async fn append_lost_sale(&self, lost_sale: &LostSale) -> RepoResult<()> {
        self.write().lost_sales.push(lost_sale.clone());
        Ok(())
    }

    async fn lost_sales_for_sku(&self, sku_id: SkuId) -> RepoResult<Vec<LostSale>> {
        Ok(self
            .read()
            .lost_sales
            .iter()
            .filter(|l| l.sku_id == Some(sku_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LedgerRepo for InMemoryStore {
    async fn ledger_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Option<LedgerBalance>> {
        Ok(self
            .read()
            .ledgers
            .iter()
            .find(|l| l.customer_id == customer_id)
            .cloned())
    }

    async fn upsert_ledger(&self, ledger: &LedgerBalance) -> RepoResult<()> {
        let mut state = self.write();
        match state
            .ledgers
            .iter_mut()
            .find(|l| l.customer_id == ledger.customer_id)
        {
            Some(existing) => *existing = ledger.clone(),
            None => state.ledgers.push(ledger.clone()),
        }
        Ok(())
    }

    async fn transactions_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Vec<Transaction>> {
        Ok(self
            .read()
            .transactions
            .iter()
            .filter(|t| t.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn overdue_ledgers(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<LedgerBalance>> {
        Ok(self
            .read()
            .ledgers
            .iter()
            .filter(|l| {
                l.balance > Decimal::ZERO
                    && l.last_payment_at.map_or(true, |at| at < cutoff)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReorderRepo for InMemoryStore {
    async fn insert_reorder(&self, request: &ReorderRequest) -> RepoResult<()> {
        let mut state = self.write();
        if state.reorders.iter().any(|r| r.id() == request.id()) {
            return Err(RepoError::Corrupt(format!(
                "duplicate reorder id {}",
                request.id()
            )));
        }
        state.reorders.push(request.clone());
        Ok(())
    }

    async fn get_reorder(&self, id: ReorderId) -> RepoResult<Option<ReorderRequest>> {
        Ok(self.read().reorders.iter().find(|r| r.id() == id).cloned())
    }

    async fn active_reorder_for(
        &self,
        supplier_id: SupplierId,
        sku_name: &str,
    ) -> RepoResult<Option<ReorderRequest>> {
        Ok(self
            .read()
            .reorders
            .iter()
            .find(|r| {
                r.is_active()
                    && r.supplier_id() == Some(supplier_id)
                    && r.sku_name().eq_ignore_ascii_case(sku_name)
            })
            .cloned())
    }

    async fn awaiting_price_from(
        &self,
        supplier_id: SupplierId,
    ) -> RepoResult<Option<ReorderRequest>> {
        let state = self.read();
        let mut best: Option<&ReorderRequest> = None;
        for r in state
            .reorders
            .iter()
            .filter(|r| {
                r.status() == ReorderStatus::PendingPrice && r.supplier_id() == Some(supplier_id)
            })
        {
            // Later insertion wins created_at ties.
            if best.map_or(true, |b| r.created_at() >= b.created_at()) {
                best = Some(r);
            }
        }
        Ok(best.cloned())
    }

    async fn last_agreed_price(
        &self,
        supplier_id: SupplierId,
        sku_name: &str,
    ) -> RepoResult<Option<Decimal>> {
        let state = self.read();
        let mut best: Option<&ReorderRequest> = None;
        for r in state.reorders.iter().filter(|r| {
            r.supplier_id() == Some(supplier_id)
                && r.sku_name().eq_ignore_ascii_case(sku_name)
                && r.unit_price().is_some()
        }) {
            if best.map_or(true, |b| r.created_at() >= b.created_at()) {
                best = Some(r);
            }
        }
        Ok(best.and_then(|r| r.unit_price()))
    }

    async fn update_reorder_if(
        &self,
        updated: &ReorderRequest,
        allowed_from: &[ReorderStatus],
    ) -> RepoResult<bool> {
        let mut state = self.write();
        let Some(existing) = state.reorders.iter_mut().find(|r| r.id() == updated.id()) else {
            return Ok(false);
        };
        if !allowed_from.contains(&existing.status()) {
            return Ok(false);
        }
        *existing = updated.clone();
        Ok(true)
    }
}

#[async_trait]
impl SignalRepo for InMemoryStore {
    async fn append_signal(&self, signal: &DemandSignal) -> RepoResult<()> {
        self.write().signals.push(signal.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use std::sync::Arc;

    use dukaan_core::{ReorderId, SkuId, StoreId, SupplierId};
    use dukaan_negotiation::reorder::{Approve, Create, Decline, ReorderCommand};
    use dukaan_negotiation::{ReorderRequest, ReorderStatus};

    use super::*;

    fn created_request(supplier_id: SupplierId, name: &str) -> ReorderRequest {
        let id = ReorderId::new();
        let mut request = ReorderRequest::empty(id);
        let events = request
            .handle(&ReorderCommand::Create(Create {
                reorder_id: id,
                store_id: StoreId::new(),
                supplier_id,
                sku_id: Some(SkuId::new()),
                sku_name: name.to_string(),
                quantity: Decimal::from(5),
                prior_price: None,
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for event in &events {
            request.apply(event);
        }
        request
    }

    fn approved(mut request: ReorderRequest) -> ReorderRequest {
        let events = request
            .handle(&ReorderCommand::Approve(Approve {
                reorder_id: request.id(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for event in &events {
            request.apply(event);
        }
        request
    }

    #[tokio::test]
    async fn conditional_update_rejects_stale_transition() {
        let db = InMemoryStore::new();
        let supplier_id = SupplierId::new();
        let request = created_request(supplier_id, "basmati rice");
        db.insert_reorder(&request).await.unwrap();

        let first = approved(request.clone());
        let wrote = db
            .update_reorder_if(&first, &[ReorderStatus::Pending, ReorderStatus::PendingPrice])
            .await
            .unwrap();
        assert!(wrote);

        // A duplicate approve computed from the same stale snapshot finds the
        // row already terminal and writes nothing.
        let duplicate = approved(request);
        let wrote = db
            .update_reorder_if(
                &duplicate,
                &[ReorderStatus::Pending, ReorderStatus::PendingPrice],
            )
            .await
            .unwrap();
        assert!(!wrote);

        let stored = db.get_reorder(first.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ReorderStatus::Approved);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_decisions_admit_exactly_one_writer() {
        let db = Arc::new(InMemoryStore::new());
        let supplier_id = SupplierId::new();
        let request = created_request(supplier_id, "poha");
        db.insert_reorder(&request).await.unwrap();

        // Approve and decline both computed from the same pending snapshot.
        let approve = approved(request.clone());
        let mut decline = request.clone();
        let events = decline
            .handle(&ReorderCommand::Decline(Decline {
                reorder_id: decline.id(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for event in &events {
            decline.apply(event);
        }

        let mut tasks = Vec::new();
        for candidate in [approve, decline] {
            let db = db.clone();
            tasks.push(tokio::spawn(async move {
                db.update_reorder_if(
                    &candidate,
                    &[ReorderStatus::Pending, ReorderStatus::PendingPrice],
                )
                .await
                .unwrap()
            }));
        }

        let mut wins = 0;
        for task in tasks {
            if task.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);

        let stored = db.get_reorder(request.id()).await.unwrap().unwrap();
        assert!(!stored.is_active());
    }

    #[tokio::test]
    async fn active_lookup_ignores_terminal_requests() {
        let db = InMemoryStore::new();
        let supplier_id = SupplierId::new();

        let done = approved(created_request(supplier_id, "jaggery"));
        db.insert_reorder(&done).await.unwrap();
        assert!(db
            .active_reorder_for(supplier_id, "Jaggery")
            .await
            .unwrap()
            .is_none());

        let open = created_request(supplier_id, "jaggery");
        db.insert_reorder(&open).await.unwrap();
        let found = db
            .active_reorder_for(supplier_id, "JAGGERY")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), open.id());
    }

    #[tokio::test]
    async fn last_agreed_price_prefers_most_recent() {
        let db = InMemoryStore::new();
        let supplier_id = SupplierId::new();

        let mut older = approved(created_request(supplier_id, "atta"));
        let mut newer = approved(created_request(supplier_id, "atta"));
        // Give them distinct prices via snapshots to avoid replaying the full
        // price round-trip here.
        let mut snap = older.to_snapshot().unwrap();
        snap.unit_price = Some(Decimal::from(40));
        older = ReorderRequest::from_snapshot(snap);
        let mut snap = newer.to_snapshot().unwrap();
        snap.unit_price = Some(Decimal::from(45));
        newer = ReorderRequest::from_snapshot(snap);

        db.insert_reorder(&older).await.unwrap();
        db.insert_reorder(&newer).await.unwrap();

        let price = db.last_agreed_price(supplier_id, "atta").await.unwrap();
        assert_eq!(price, Some(Decimal::from(45)));
    }
}
