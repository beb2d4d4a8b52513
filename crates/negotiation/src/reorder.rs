use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dukaan_core::{DomainError, ReorderId, SkuId, StoreId, SupplierId};

use crate::invoice::InvoiceView;

/// Reorder request status lifecycle.
///
/// `pending -> {approved, declined, pending_price}`;
/// `pending_price -> pending` on a valid price reply, and approve/decline
/// remain addressable directly from `pending_price`. `approved` and
/// `declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderStatus {
    Pending,
    PendingPrice,
    Approved,
    Declined,
}

impl ReorderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReorderStatus::Approved | ReorderStatus::Declined)
    }

    /// States from which approve/decline are legal.
    pub fn is_decidable(self) -> bool {
        matches!(self, ReorderStatus::Pending | ReorderStatus::PendingPrice)
    }
}

impl core::fmt::Display for ReorderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ReorderStatus::Pending => "pending",
            ReorderStatus::PendingPrice => "pending_price",
            ReorderStatus::Approved => "approved",
            ReorderStatus::Declined => "declined",
        };
        f.write_str(s)
    }
}

impl core::str::FromStr for ReorderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReorderStatus::Pending),
            "pending_price" => Ok(ReorderStatus::PendingPrice),
            "approved" => Ok(ReorderStatus::Approved),
            "declined" => Ok(ReorderStatus::Declined),
            other => Err(DomainError::validation(format!(
                "unknown reorder status '{other}'"
            ))),
        }
    }
}

/// The negotiation entity: a store's restock ask to a supplier.
///
/// Never deleted (retained for audit/billing); status is mutated only through
/// `handle`/`apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    id: ReorderId,
    store_id: Option<StoreId>,
    supplier_id: Option<SupplierId>,
    sku_id: Option<SkuId>,
    sku_name: String,
    quantity: Decimal,
    unit_price: Option<Decimal>,
    total_amount: Option<Decimal>,
    status: ReorderStatus,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl ReorderRequest {
    /// Create an empty, not-yet-created instance for rehydration.
    pub fn empty(id: ReorderId) -> Self {
        Self {
            id,
            store_id: None,
            supplier_id: None,
            sku_id: None,
            sku_name: String::new(),
            quantity: Decimal::ZERO,
            unit_price: None,
            total_amount: None,
            status: ReorderStatus::Pending,
            created_at: None,
            updated_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id(&self) -> ReorderId {
        self.id
    }

    pub fn store_id(&self) -> Option<StoreId> {
        self.store_id
    }

    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier_id
    }

    pub fn sku_id(&self) -> Option<SkuId> {
        self.sku_id
    }

    pub fn sku_name(&self) -> &str {
        &self.sku_name
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Option<Decimal> {
        self.unit_price
    }

    pub fn total_amount(&self) -> Option<Decimal> {
        self.total_amount
    }

    pub fn status(&self) -> ReorderStatus {
        self.status
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether this request is still negotiable (counts toward the one-active-
    /// negotiation-per-(supplier, item) rule).
    pub fn is_active(&self) -> bool {
        self.created && !self.status.is_terminal()
    }

    /// Invoice view of the current state (valid once approved).
    pub fn invoice(&self) -> InvoiceView {
        InvoiceView {
            sku_name: self.sku_name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_amount: self.total_amount.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Persistence snapshot of a reorder request.
///
/// The row stores exactly this shape; `created` is implied by row existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSnapshot {
    pub id: ReorderId,
    pub store_id: StoreId,
    pub supplier_id: SupplierId,
    pub sku_id: Option<SkuId>,
    pub sku_name: String,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub status: ReorderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl ReorderRequest {
    /// Snapshot for persistence. Only valid on created requests.
    pub fn to_snapshot(&self) -> Result<ReorderSnapshot, DomainError> {
        let (store_id, supplier_id, created_at, updated_at) = match (
            self.store_id,
            self.supplier_id,
            self.created_at,
            self.updated_at,
        ) {
            (Some(s), Some(p), Some(c), Some(u)) if self.created => (s, p, c, u),
            _ => {
                return Err(DomainError::invariant(
                    "cannot snapshot a reorder request that was never created",
                ))
            }
        };

        Ok(ReorderSnapshot {
            id: self.id,
            store_id,
            supplier_id,
            sku_id: self.sku_id,
            sku_name: self.sku_name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_amount: self.total_amount,
            status: self.status,
            created_at,
            updated_at,
            version: self.version,
        })
    }

    pub fn from_snapshot(snapshot: ReorderSnapshot) -> Self {
        Self {
            id: snapshot.id,
            store_id: Some(snapshot.store_id),
            supplier_id: Some(snapshot.supplier_id),
            sku_id: snapshot.sku_id,
            sku_name: snapshot.sku_name,
            quantity: snapshot.quantity,
            unit_price: snapshot.unit_price,
            total_amount: snapshot.total_amount,
            status: snapshot.status,
            created_at: Some(snapshot.created_at),
            updated_at: Some(snapshot.updated_at),
            version: snapshot.version,
            created: true,
        }
    }
}

/// Command: create a reorder request from an owner reorder intent.
///
/// `prior_price` is the most recent previously-agreed unit price for this
/// (supplier, item) pair, looked up by the caller; when present the request
/// starts pre-priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Create {
    pub reorder_id: ReorderId,
    pub store_id: StoreId,
    pub supplier_id: SupplierId,
    pub sku_id: Option<SkuId>,
    pub sku_name: String,
    pub quantity: Decimal,
    pub prior_price: Option<Decimal>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: supplier asks to (re)negotiate the unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPriceUpdate {
    pub reorder_id: ReorderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: supplier replies with a numeric price while in `pending_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitPrice {
    pub reorder_id: ReorderId,
    pub price: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: supplier approves the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approve {
    pub reorder_id: ReorderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: supplier declines the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decline {
    pub reorder_id: ReorderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: render the bill for an approved request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateBill {
    pub reorder_id: ReorderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorderCommand {
    Create(Create),
    RequestPriceUpdate(RequestPriceUpdate),
    SubmitPrice(SubmitPrice),
    Approve(Approve),
    Decline(Decline),
    GenerateBill(GenerateBill),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorderEvent {
    Created {
        reorder_id: ReorderId,
        store_id: StoreId,
        supplier_id: SupplierId,
        sku_id: Option<SkuId>,
        sku_name: String,
        quantity: Decimal,
        unit_price: Option<Decimal>,
        total_amount: Option<Decimal>,
        occurred_at: DateTime<Utc>,
    },
    PriceUpdateRequested {
        reorder_id: ReorderId,
        occurred_at: DateTime<Utc>,
    },
    PriceSubmitted {
        reorder_id: ReorderId,
        unit_price: Decimal,
        total_amount: Decimal,
        occurred_at: DateTime<Utc>,
    },
    Approved {
        reorder_id: ReorderId,
        occurred_at: DateTime<Utc>,
    },
    Declined {
        reorder_id: ReorderId,
        occurred_at: DateTime<Utc>,
    },
    BillGenerated {
        reorder_id: ReorderId,
        invoice: InvoiceView,
        occurred_at: DateTime<Utc>,
    },
}

impl ReorderRequest {
    /// Fold an event into state. Deterministic version tracking: +1 per event.
    pub fn apply(&mut self, event: &ReorderEvent) {
        match event {
            ReorderEvent::Created {
                reorder_id,
                store_id,
                supplier_id,
                sku_id,
                sku_name,
                quantity,
                unit_price,
                total_amount,
                occurred_at,
            } => {
                self.id = *reorder_id;
                self.store_id = Some(*store_id);
                self.supplier_id = Some(*supplier_id);
                self.sku_id = *sku_id;
                self.sku_name = sku_name.clone();
                self.quantity = *quantity;
                self.unit_price = *unit_price;
                self.total_amount = *total_amount;
                self.status = ReorderStatus::Pending;
                self.created_at = Some(*occurred_at);
                self.updated_at = Some(*occurred_at);
                self.created = true;
            }
            ReorderEvent::PriceUpdateRequested { occurred_at, .. } => {
                self.status = ReorderStatus::PendingPrice;
                self.updated_at = Some(*occurred_at);
            }
            ReorderEvent::PriceSubmitted {
                unit_price,
                total_amount,
                occurred_at,
                ..
            } => {
                self.unit_price = Some(*unit_price);
                self.total_amount = Some(*total_amount);
                self.status = ReorderStatus::Pending;
                self.updated_at = Some(*occurred_at);
            }
            ReorderEvent::Approved { occurred_at, .. } => {
                self.status = ReorderStatus::Approved;
                self.updated_at = Some(*occurred_at);
            }
            ReorderEvent::Declined { occurred_at, .. } => {
                self.status = ReorderStatus::Declined;
                self.updated_at = Some(*occurred_at);
            }
            ReorderEvent::BillGenerated { .. } => {
                // Billing is a read of approved state; nothing changes.
            }
        }

        self.version += 1;
    }

    /// Central transition table: state x command -> events | reject.
    pub fn handle(&self, command: &ReorderCommand) -> Result<Vec<ReorderEvent>, DomainError> {
        match command {
            ReorderCommand::Create(cmd) => self.handle_create(cmd),
            ReorderCommand::RequestPriceUpdate(cmd) => self.handle_request_price_update(cmd),
            ReorderCommand::SubmitPrice(cmd) => self.handle_submit_price(cmd),
            ReorderCommand::Approve(cmd) => self.handle_approve(cmd),
            ReorderCommand::Decline(cmd) => self.handle_decline(cmd),
            ReorderCommand::GenerateBill(cmd) => self.handle_generate_bill(cmd),
        }
    }

    fn ensure_exists(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_decidable(&self) -> Result<(), DomainError> {
        if !self.status.is_decidable() {
            return Err(DomainError::conflict(format!("already {}", self.status)));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &Create) -> Result<Vec<ReorderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("reorder request already exists"));
        }

        if cmd.quantity <= Decimal::ZERO {
            return Err(DomainError::validation("quantity must be positive"));
        }

        if cmd.sku_name.trim().is_empty() {
            return Err(DomainError::validation("item name must not be empty"));
        }

        let total = cmd.prior_price.map(|p| p * cmd.quantity);

        Ok(vec![ReorderEvent::Created {
            reorder_id: cmd.reorder_id,
            store_id: cmd.store_id,
            supplier_id: cmd.supplier_id,
            sku_id: cmd.sku_id,
            sku_name: cmd.sku_name.clone(),
            quantity: cmd.quantity,
            unit_price: cmd.prior_price,
            total_amount: total,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_request_price_update(
        &self,
        cmd: &RequestPriceUpdate,
    ) -> Result<Vec<ReorderEvent>, DomainError> {
        self.ensure_exists()?;
        // Same guard as approve/decline: terminal orders are closed.
        self.ensure_decidable()?;

        Ok(vec![ReorderEvent::PriceUpdateRequested {
            reorder_id: cmd.reorder_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_submit_price(&self, cmd: &SubmitPrice) -> Result<Vec<ReorderEvent>, DomainError> {
        self.ensure_exists()?;

        if self.status != ReorderStatus::PendingPrice {
            return Err(DomainError::invariant(
                "price replies are only accepted while a price update is pending",
            ));
        }

        if cmd.price <= Decimal::ZERO {
            return Err(DomainError::validation("price must be a positive number"));
        }

        Ok(vec![ReorderEvent::PriceSubmitted {
            reorder_id: cmd.reorder_id,
            unit_price: cmd.price,
            total_amount: cmd.price * self.quantity,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_approve(&self, cmd: &Approve) -> Result<Vec<ReorderEvent>, DomainError> {
        self.ensure_exists()?;
        self.ensure_decidable()?;

        Ok(vec![ReorderEvent::Approved {
            reorder_id: cmd.reorder_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_decline(&self, cmd: &Decline) -> Result<Vec<ReorderEvent>, DomainError> {
        self.ensure_exists()?;
        self.ensure_decidable()?;

        Ok(vec![ReorderEvent::Declined {
            reorder_id: cmd.reorder_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_generate_bill(&self, cmd: &GenerateBill) -> Result<Vec<ReorderEvent>, DomainError> {
        self.ensure_exists()?;

        // Invariant: bills only exist for approved orders.
        if self.status != ReorderStatus::Approved {
            return Err(DomainError::invariant(
                "bill can only be generated for an approved order",
            ));
        }

        Ok(vec![ReorderEvent::BillGenerated {
            reorder_id: cmd.reorder_id,
            invoice: self.invoice(),
            occurred_at: cmd.occurred_at,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn created_request(prior_price: Option<Decimal>) -> ReorderRequest {
        let id = ReorderId::new();
        let mut request = ReorderRequest::empty(id);
        let events = request
            .handle(&ReorderCommand::Create(Create {
                reorder_id: id,
                store_id: StoreId::new(),
                supplier_id: SupplierId::new(),
                sku_id: Some(SkuId::new()),
                sku_name: "Basmati Rice".to_string(),
                quantity: dec(3),
                prior_price,
                occurred_at: test_time(),
            }))
            .unwrap();
        request.apply(&events[0]);
        request
    }

    fn drive(request: &mut ReorderRequest, command: ReorderCommand) -> Vec<ReorderEvent> {
        let events = request.handle(&command).unwrap();
        for e in &events {
            request.apply(e);
        }
        events
    }

    #[test]
    fn create_without_prior_price_is_pending_and_unpriced() {
        let request = created_request(None);

        assert_eq!(request.status(), ReorderStatus::Pending);
        assert_eq!(request.unit_price(), None);
        assert_eq!(request.total_amount(), None);
        assert!(request.is_active());
    }

    #[test]
    fn create_with_prior_price_carries_total() {
        let request = created_request(Some(dec(40)));

        assert_eq!(request.status(), ReorderStatus::Pending);
        assert_eq!(request.unit_price(), Some(dec(40)));
        assert_eq!(request.total_amount(), Some(dec(120)));
    }

    #[test]
    fn create_rejects_non_positive_quantity() {
        let id = ReorderId::new();
        let request = ReorderRequest::empty(id);
        let err = request
            .handle(&ReorderCommand::Create(Create {
                reorder_id: id,
                store_id: StoreId::new(),
                supplier_id: SupplierId::new(),
                sku_id: None,
                sku_name: "Sugar".to_string(),
                quantity: dec(0),
                prior_price: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn price_negotiation_round_trip() {
        let mut request = created_request(None);
        let id = request.id();

        drive(
            &mut request,
            ReorderCommand::RequestPriceUpdate(RequestPriceUpdate {
                reorder_id: id,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(request.status(), ReorderStatus::PendingPrice);

        drive(
            &mut request,
            ReorderCommand::SubmitPrice(SubmitPrice {
                reorder_id: id,
                price: dec(120),
                occurred_at: test_time(),
            }),
        );
        assert_eq!(request.status(), ReorderStatus::Pending);
        assert_eq!(request.unit_price(), Some(dec(120)));
        assert_eq!(request.total_amount(), Some(dec(360)));
    }

    #[test]
    fn price_reply_outside_pending_price_is_rejected() {
        let request = created_request(None);
        let err = request
            .handle(&ReorderCommand::SubmitPrice(SubmitPrice {
                reorder_id: request.id(),
                price: dec(50),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn non_positive_price_is_rejected_without_transition() {
        let mut request = created_request(None);
        let id = request.id();
        drive(
            &mut request,
            ReorderCommand::RequestPriceUpdate(RequestPriceUpdate {
                reorder_id: id,
                occurred_at: test_time(),
            }),
        );

        let err = request
            .handle(&ReorderCommand::SubmitPrice(SubmitPrice {
                reorder_id: request.id(),
                price: dec(-5),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(request.status(), ReorderStatus::PendingPrice);
    }

    #[test]
    fn approve_is_legal_from_pending_and_pending_price() {
        let mut pending = created_request(Some(dec(10)));
        let pending_id = pending.id();
        drive(
            &mut pending,
            ReorderCommand::Approve(Approve {
                reorder_id: pending_id,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(pending.status(), ReorderStatus::Approved);

        let mut mid_negotiation = created_request(None);
        let mid_id = mid_negotiation.id();
        drive(
            &mut mid_negotiation,
            ReorderCommand::RequestPriceUpdate(RequestPriceUpdate {
                reorder_id: mid_id,
                occurred_at: test_time(),
            }),
        );
        drive(
            &mut mid_negotiation,
            ReorderCommand::Approve(Approve {
                reorder_id: mid_id,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(mid_negotiation.status(), ReorderStatus::Approved);
    }

    #[test]
    fn terminal_states_reject_replayed_decisions() {
        let mut request = created_request(Some(dec(10)));
        let id = request.id();
        drive(
            &mut request,
            ReorderCommand::Approve(Approve {
                reorder_id: id,
                occurred_at: test_time(),
            }),
        );

        for command in [
            ReorderCommand::Approve(Approve {
                reorder_id: request.id(),
                occurred_at: test_time(),
            }),
            ReorderCommand::Decline(Decline {
                reorder_id: request.id(),
                occurred_at: test_time(),
            }),
            ReorderCommand::RequestPriceUpdate(RequestPriceUpdate {
                reorder_id: request.id(),
                occurred_at: test_time(),
            }),
        ] {
            let err = request.handle(&command).unwrap_err();
            match err {
                DomainError::Conflict(msg) => assert!(msg.contains("already approved")),
                other => panic!("expected Conflict, got {other:?}"),
            }
        }
        assert_eq!(request.status(), ReorderStatus::Approved);
        assert!(!request.is_active());
    }

    #[test]
    fn bill_requires_approval() {
        let request = created_request(Some(dec(50)));
        let err = request
            .handle(&ReorderCommand::GenerateBill(GenerateBill {
                reorder_id: request.id(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn bill_for_approved_order_carries_invoice_totals() {
        let mut request = created_request(Some(dec(50)));
        let id = request.id();
        drive(
            &mut request,
            ReorderCommand::Approve(Approve {
                reorder_id: id,
                occurred_at: test_time(),
            }),
        );

        let events = drive(
            &mut request,
            ReorderCommand::GenerateBill(GenerateBill {
                reorder_id: id,
                occurred_at: test_time(),
            }),
        );

        match &events[0] {
            ReorderEvent::BillGenerated { invoice, .. } => {
                assert_eq!(invoice.total_amount, dec(150));
                assert_eq!(invoice.unit_price, Some(dec(50)));
            }
            other => panic!("expected BillGenerated, got {other:?}"),
        }
        // Billing never changes status.
        assert_eq!(request.status(), ReorderStatus::Approved);
    }
}
