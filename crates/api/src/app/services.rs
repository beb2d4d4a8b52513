//! The message pipeline.
//!
//! One inbound chat message comes in; sender classification decides whose
//! playbook applies (store owner, supplier, or nobody), the intent/button
//! layer decides the operation, and every state change goes through the
//! domain `handle`/`apply` pair plus the storage layer's conditional write.
//! Outbound notifications are composed after the mutation and delivered
//! best-effort; a failed send never rolls anything back.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use dukaan_catalog::{best_match, ResolutionCache, Sku};
use dukaan_core::{DomainError, ReorderId, StoreId};
use dukaan_demand::{DemandModel, DemandScore, DemandSignal, LostSaleSample, DEFAULT_ALERT_THRESHOLD};
use dukaan_infra::repos::{Datastore, RepoError};
use dukaan_inventory::{InventoryRecord, LostSale};
use dukaan_khata::{lead_score, KhataEntry, LedgerBalance};
use dukaan_messaging::{
    ButtonAction, Choice, InboundMessage, Intent, IntentClassifier, IntentExtraction,
    MessageKind, NotificationIntent, NotificationSender, Transcriber,
};
use dukaan_negotiation::reorder::{
    Approve, Create, Decline, ReorderCommand, RequestPriceUpdate, SubmitPrice,
};
use dukaan_negotiation::{ReorderRequest, ReorderStatus};
use dukaan_parties::{match_customer_by_name, Store, Supplier};

/// Classifier extractions below this confidence are logged, not rejected.
const LOW_CONFIDENCE_FLOOR: f64 = 0.6;

/// Sales-velocity input until a real velocity source is wired in.
const DEFAULT_VELOCITY: f64 = 0.5;
/// Seasonality contributes nothing until a signal source exists.
const DEFAULT_SEASONALITY: f64 = 0.0;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] RepoError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Who an inbound channel address belongs to.
enum SenderRole {
    Owner(Store),
    Supplier(Supplier),
    Unknown,
}

/// Outcome of one guarded reorder transition.
enum TransitionOutcome {
    Applied(ReorderRequest),
    /// The domain refused the command (e.g. the request is terminal).
    Rejected(DomainError),
    /// The conditional write found the row already moved; this command was a
    /// duplicate or lost a race.
    Stale,
}

pub struct AppServices {
    db: Arc<dyn Datastore>,
    classifier: Arc<dyn IntentClassifier>,
    transcriber: Arc<dyn Transcriber>,
    sender: Arc<dyn NotificationSender>,
    sku_cache: ResolutionCache,
    demand_model: DemandModel,
    alert_threshold: f64,
    velocity: f64,
    seasonality: f64,
}

impl AppServices {
    pub fn new(
        db: Arc<dyn Datastore>,
        classifier: Arc<dyn IntentClassifier>,
        transcriber: Arc<dyn Transcriber>,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            db,
            classifier,
            transcriber,
            sender,
            sku_cache: ResolutionCache::new(),
            demand_model: DemandModel::new(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            velocity: DEFAULT_VELOCITY,
            seasonality: DEFAULT_SEASONALITY,
        }
    }

    pub fn with_alert_threshold(mut self, threshold: f64) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Entry point for one inbound message.
    pub async fn process_message(&self, message: InboundMessage) -> Result<(), PipelineError> {
        let InboundMessage { from, kind } = message;

        let role = self.classify_sender(&from).await?;
        if matches!(role, SenderRole::Unknown) {
            warn!(from = %from, "message from unregistered sender, ignoring");
            return Ok(());
        }

        // Voice notes become text before any routing; an unprocessable note
        // is acknowledged without touching state.
        let kind = match kind {
            MessageKind::Audio { url } => match self.transcriber.transcribe(&url).await {
                Some(text) => MessageKind::Text { body: text },
                None => {
                    self.deliver(NotificationIntent::text(
                        from.clone(),
                        "Sorry, I couldn't understand that voice note. Please type it instead.",
                    ))
                    .await;
                    return Ok(());
                }
            },
            kind => kind,
        };

        match (role, kind) {
            (SenderRole::Owner(store), MessageKind::Text { body }) => {
                self.handle_owner_text(&store, &body).await
            }
            (SenderRole::Owner(_), MessageKind::Button { id, .. }) => {
                warn!(button = %id, "button tap from owner, ignoring");
                Ok(())
            }
            (SenderRole::Supplier(supplier), MessageKind::Text { body }) => {
                self.handle_supplier_text(&supplier, &body).await
            }
            (SenderRole::Supplier(supplier), MessageKind::Button { id, .. }) => {
                self.handle_supplier_button(&supplier, &id).await
            }
            (_, MessageKind::Other { kind }) => {
                debug!(kind, "unsupported message kind, acknowledged as no-op");
                Ok(())
            }
            // Unknown senders and raw audio were both resolved above.
            (_, _) => Ok(()),
        }
    }

    async fn classify_sender(
        &self,
        from: &dukaan_core::ChannelAddress,
    ) -> Result<SenderRole, PipelineError> {
        // Owner wins if an address is somehow registered for both.
        if let Some(store) = self.db.store_by_contact(from).await? {
            return Ok(SenderRole::Owner(store));
        }
        if let Some(supplier) = self.db.supplier_by_contact(from).await? {
            return Ok(SenderRole::Supplier(supplier));
        }
        Ok(SenderRole::Unknown)
    }

    // ----- owner playbook -----

    async fn handle_owner_text(&self, store: &Store, text: &str) -> Result<(), PipelineError> {
        let extraction = match self.classifier.classify(text).await {
            Ok(extraction) => extraction,
            Err(err) => {
                warn!(error = %err, "intent classification failed");
                IntentExtraction::unknown(text, err.to_string())
            }
        };
        if extraction.intent != Intent::Unknown && extraction.confidence < LOW_CONFIDENCE_FLOOR {
            warn!(
                intent = ?extraction.intent,
                confidence = extraction.confidence,
                "acting on a low-confidence extraction"
            );
        }

        match extraction.intent {
            Intent::StockUpdate => self.owner_stock_update(store, &extraction).await,
            Intent::LostSale => self.owner_lost_sale(store, &extraction).await,
            Intent::Reorder => self.owner_reorder(store, &extraction).await,
            Intent::KhataUpdate => self.owner_khata_update(store, text).await,
            Intent::DeliveryConfirmation => self.owner_delivery(store, &extraction).await,
            Intent::Unknown => {
                self.reply(
                    store,
                    "I didn't catch that. You can send stock updates, reorders, \
                     lost sales, or khata updates.",
                )
                .await;
                Ok(())
            }
        }
    }

    async fn owner_stock_update(
        &self,
        store: &Store,
        extraction: &IntentExtraction,
    ) -> Result<(), PipelineError> {
        let (Some(name), Some(qty)) = (&extraction.sku_name, extraction.quantity) else {
            self.reply(store, "Which item, and how many? e.g. \"add 10 kg rice\"")
                .await;
            return Ok(());
        };
        let Some(sku) = self.resolve_sku(store.id, name).await? else {
            self.reply(store, format!("I couldn't find \"{name}\" in your catalog."))
                .await;
            return Ok(());
        };

        let updated = self.adjust_stock(&sku, qty).await?;
        info!(sku = %sku.name, level = %updated.stock_level, "stock updated");
        self.reply(
            store,
            format!(
                "Stock updated: {} now at {}.",
                sku.name,
                updated.stock_level.normalize()
            ),
        )
        .await;
        Ok(())
    }

    async fn owner_lost_sale(
        &self,
        store: &Store,
        extraction: &IntentExtraction,
    ) -> Result<(), PipelineError> {
        let Some(name) = &extraction.sku_name else {
            self.reply(store, "Which item did the customer ask for?").await;
            return Ok(());
        };
        let qty = extraction.quantity.unwrap_or(Decimal::ONE);
        let now = Utc::now();

        let resolved = self.resolve_sku(store.id, name).await?;
        let lost_sale = match &resolved {
            Some(sku) => LostSale::resolved(store.id, sku.id, sku.name.clone(), qty, now),
            None => LostSale::unresolved(store.id, name.clone(), qty, now),
        };
        self.db.append_lost_sale(&lost_sale).await?;

        self.reply(
            store,
            format!("Noted: missed sale of {} x {}.", qty.normalize(), lost_sale.sku_name),
        )
        .await;

        // Demand is only scoreable once the item maps to a real SKU.
        if let Some(sku) = resolved {
            let score = self.evaluate_demand(&sku).await?;
            if score.exceeds(self.alert_threshold) {
                self.reply(
                    store,
                    format!(
                        "Demand for {} is building (score {:.1}). Consider sending a reorder.",
                        sku.name, score.score
                    ),
                )
                .await;
            }
        }
        Ok(())
    }

    async fn owner_reorder(
        &self,
        store: &Store,
        extraction: &IntentExtraction,
    ) -> Result<(), PipelineError> {
        let (Some(name), Some(qty)) = (&extraction.sku_name, extraction.quantity) else {
            self.reply(store, "What should I reorder, and how much? e.g. \"reorder 20 kg atta\"")
                .await;
            return Ok(());
        };
        let Some(sku) = self.resolve_sku(store.id, name).await? else {
            self.reply(store, format!("I couldn't find \"{name}\" in your catalog."))
                .await;
            return Ok(());
        };
        let Some(supplier) = self
            .db
            .supplier_for_category(store.id, &sku.category)
            .await?
        else {
            self.reply(
                store,
                format!("No supplier on file for {} items.", sku.category),
            )
            .await;
            return Ok(());
        };

        if let Some(open) = self.db.active_reorder_for(supplier.id, &sku.name).await? {
            self.reply(
                store,
                format!(
                    "There is already an open reorder with {} for {} ({}).",
                    supplier.name,
                    sku.name,
                    open.status()
                ),
            )
            .await;
            return Ok(());
        }

        let prior_price = self.db.last_agreed_price(supplier.id, &sku.name).await?;

        let reorder_id = ReorderId::new();
        let mut request = ReorderRequest::empty(reorder_id);
        let events = request.handle(&ReorderCommand::Create(Create {
            reorder_id,
            store_id: store.id,
            supplier_id: supplier.id,
            sku_id: Some(sku.id),
            sku_name: sku.name.clone(),
            quantity: qty,
            prior_price,
            occurred_at: Utc::now(),
        }))?;
        for event in &events {
            request.apply(event);
        }
        self.db.insert_reorder(&request).await?;
        info!(reorder_id = %reorder_id, supplier = %supplier.name, "reorder created");

        let mut body = format!(
            "New reorder from {}:\n{} x {}",
            store.name,
            qty.normalize(),
            sku.name
        );
        if let (Some(price), Some(total)) = (request.unit_price(), request.total_amount()) {
            body.push_str(&format!("\nLast price: Rs {price}/unit (total Rs {total})"));
        }
        self.deliver(NotificationIntent::with_choices(
            supplier.contact.clone(),
            body,
            vec![
                Choice::new(ButtonAction::Approve(reorder_id).payload(), "Approve"),
                Choice::new(ButtonAction::UpdatePrice(reorder_id).payload(), "Update Price"),
                Choice::new(ButtonAction::Decline(reorder_id).payload(), "Decline"),
            ],
        ))
        .await;
        self.reply(
            store,
            format!(
                "Reorder sent to {}: {} x {}.",
                supplier.name,
                qty.normalize(),
                sku.name
            ),
        )
        .await;
        Ok(())
    }

    async fn owner_khata_update(&self, store: &Store, text: &str) -> Result<(), PipelineError> {
        let parsed = match self.classifier.parse_khata(text).await {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "khata parsing failed");
                self.reply(
                    store,
                    "I couldn't read that khata update. Try \"Ramesh paid 500\".",
                )
                .await;
                return Ok(());
            }
        };

        let customers = self.db.customers_for_store(store.id).await?;
        let Some(customer) = match_customer_by_name(&parsed.customer_name, &customers) else {
            self.reply(
                store,
                format!("No customer named \"{}\" on your khata.", parsed.customer_name),
            )
            .await;
            return Ok(());
        };

        let ledger = self
            .db
            .ledger_for_customer(customer.id)
            .await?
            .unwrap_or_else(|| LedgerBalance::opening(customer.id));
        let entry = KhataEntry {
            customer_id: customer.id,
            action: parsed.action,
            amount: parsed.amount,
            recorded_at: Utc::now(),
        };
        let updated = ledger.apply(&entry);

        // Reliability score is a cached derivation, refreshed on every
        // ledger mutation.
        let transactions = self.db.transactions_for_customer(customer.id).await?;
        let score = lead_score(&transactions, updated.balance);
        let updated = updated.with_lead_score(score);
        self.db.upsert_ledger(&updated).await?;

        self.reply(
            store,
            format!(
                "Khata updated for {}: balance Rs {}.",
                customer.name, updated.balance
            ),
        )
        .await;
        Ok(())
    }

    async fn owner_delivery(
        &self,
        store: &Store,
        extraction: &IntentExtraction,
    ) -> Result<(), PipelineError> {
        // Delivery confirmations double as stock arrivals when the item and
        // quantity are recoverable from the message.
        if let (Some(name), Some(qty)) = (&extraction.sku_name, extraction.quantity) {
            if let Some(sku) = self.resolve_sku(store.id, name).await? {
                let updated = self.adjust_stock(&sku, qty).await?;
                self.reply(
                    store,
                    format!(
                        "Delivery recorded: {} x {}. Stock now {}.",
                        qty.normalize(),
                        sku.name,
                        updated.stock_level.normalize()
                    ),
                )
                .await;
                return Ok(());
            }
        }
        self.reply(store, "Delivery noted.").await;
        Ok(())
    }

    // ----- supplier playbook -----

    async fn handle_supplier_button(
        &self,
        supplier: &Supplier,
        payload: &str,
    ) -> Result<(), PipelineError> {
        let action = match ButtonAction::from_str(payload) {
            Ok(action) => action,
            Err(err) => {
                warn!(payload, error = %err, "malformed button payload");
                self.notify_supplier(supplier, "Sorry, that button didn't work. Please try again.")
                    .await;
                return Ok(());
            }
        };

        let Some(reorder) = self.db.get_reorder(action.reorder_id()).await? else {
            self.notify_supplier(supplier, "That order no longer exists.").await;
            return Ok(());
        };
        if reorder.supplier_id() != Some(supplier.id) {
            warn!(
                reorder_id = %reorder.id(),
                supplier = %supplier.id,
                "button tap for another supplier's order, ignoring"
            );
            return Ok(());
        }
        let store = match reorder.store_id() {
            Some(store_id) => self.db.get_store(store_id).await?,
            None => None,
        };
        let Some(store) = store else {
            warn!(reorder_id = %reorder.id(), "reorder references a missing store");
            return Ok(());
        };

        let now = Utc::now();
        match action {
            ButtonAction::Approve(reorder_id) => {
                let outcome = self
                    .transition(
                        &reorder,
                        ReorderCommand::Approve(Approve {
                            reorder_id,
                            occurred_at: now,
                        }),
                        &[ReorderStatus::Pending, ReorderStatus::PendingPrice],
                    )
                    .await?;
                match outcome {
                    TransitionOutcome::Applied(updated) => {
                        let total = updated
                            .total_amount()
                            .map(|t| format!(" Total: Rs {t}."))
                            .unwrap_or_default();
                        self.reply(
                            &store,
                            format!(
                                "{} approved your reorder: {} x {}.{}",
                                supplier.name,
                                updated.quantity().normalize(),
                                updated.sku_name(),
                                total
                            ),
                        )
                        .await;
                        self.deliver(NotificationIntent::with_choices(
                            supplier.contact.clone(),
                            "Order approved. You can generate the bill.",
                            vec![Choice::new(
                                ButtonAction::GenerateBill(reorder_id).payload(),
                                "Generate Bill",
                            )],
                        ))
                        .await;
                    }
                    TransitionOutcome::Rejected(_) | TransitionOutcome::Stale => {
                        self.already_settled(supplier, reorder.id()).await?;
                    }
                }
            }
            ButtonAction::Decline(reorder_id) => {
                let outcome = self
                    .transition(
                        &reorder,
                        ReorderCommand::Decline(Decline {
                            reorder_id,
                            occurred_at: now,
                        }),
                        &[ReorderStatus::Pending, ReorderStatus::PendingPrice],
                    )
                    .await?;
                match outcome {
                    TransitionOutcome::Applied(updated) => {
                        self.reply(
                            &store,
                            format!(
                                "{} declined the reorder for {}.",
                                supplier.name,
                                updated.sku_name()
                            ),
                        )
                        .await;
                        self.notify_supplier(supplier, "Order declined.").await;
                    }
                    TransitionOutcome::Rejected(_) | TransitionOutcome::Stale => {
                        self.already_settled(supplier, reorder.id()).await?;
                    }
                }
            }
            ButtonAction::UpdatePrice(reorder_id) => {
                let outcome = self
                    .transition(
                        &reorder,
                        ReorderCommand::RequestPriceUpdate(RequestPriceUpdate {
                            reorder_id,
                            occurred_at: now,
                        }),
                        &[ReorderStatus::Pending, ReorderStatus::PendingPrice],
                    )
                    .await?;
                match outcome {
                    TransitionOutcome::Applied(updated) => {
                        self.notify_supplier(
                            supplier,
                            format!(
                                "Please reply with your price per unit for {}.",
                                updated.sku_name()
                            ),
                        )
                        .await;
                    }
                    TransitionOutcome::Rejected(_) | TransitionOutcome::Stale => {
                        self.already_settled(supplier, reorder.id()).await?;
                    }
                }
            }
            ButtonAction::GenerateBill(_) => {
                if reorder.status() != ReorderStatus::Approved {
                    self.notify_supplier(supplier, "Approve the order before generating a bill.")
                        .await;
                    return Ok(());
                }
                // The bill fans out to both parties: the supplier keeps a
                // copy, the owner sees who it came from.
                let invoice = reorder.invoice().render();
                self.reply(&store, format!("{}:\n{}", supplier.name, invoice))
                    .await;
                self.notify_supplier(supplier, invoice).await;
            }
        }
        Ok(())
    }

    async fn handle_supplier_text(
        &self,
        supplier: &Supplier,
        text: &str,
    ) -> Result<(), PipelineError> {
        let Some(reorder) = self.db.awaiting_price_from(supplier.id).await? else {
            self.notify_supplier(supplier, "No open order is waiting on a price right now.")
                .await;
            return Ok(());
        };
        let Some(price) = parse_price(text) else {
            self.notify_supplier(
                supplier,
                "Please reply with just the price per unit, e.g. 45 or 45.50.",
            )
            .await;
            return Ok(());
        };

        let outcome = self
            .transition(
                &reorder,
                ReorderCommand::SubmitPrice(SubmitPrice {
                    reorder_id: reorder.id(),
                    price,
                    occurred_at: Utc::now(),
                }),
                &[ReorderStatus::PendingPrice],
            )
            .await?;
        match outcome {
            TransitionOutcome::Applied(updated) => {
                let store = match updated.store_id() {
                    Some(store_id) => self.db.get_store(store_id).await?,
                    None => None,
                };
                if let Some(store) = store {
                    self.reply(
                        &store,
                        format!(
                            "{} quoted Rs {}/unit for {}. New total: Rs {}.",
                            supplier.name,
                            price,
                            updated.sku_name(),
                            updated.total_amount().unwrap_or(Decimal::ZERO)
                        ),
                    )
                    .await;
                }
                self.deliver(NotificationIntent::with_choices(
                    supplier.contact.clone(),
                    format!("Price recorded: Rs {price}/unit. Approve the order at this price?"),
                    vec![
                        Choice::new(ButtonAction::Approve(updated.id()).payload(), "Approve"),
                        Choice::new(ButtonAction::Decline(updated.id()).payload(), "Decline"),
                    ],
                ))
                .await;
            }
            TransitionOutcome::Rejected(err) => {
                debug!(error = %err, "price submission rejected");
                self.notify_supplier(supplier, "That order is no longer waiting on a price.")
                    .await;
            }
            TransitionOutcome::Stale => {
                self.already_settled(supplier, reorder.id()).await?;
            }
        }
        Ok(())
    }

    // ----- shared plumbing -----

    /// Run one guarded transition: domain check first, then the conditional
    /// write. The domain can reject outright; the write can find the row
    /// already moved by a concurrent or duplicate event.
    async fn transition(
        &self,
        reorder: &ReorderRequest,
        command: ReorderCommand,
        allowed_from: &[ReorderStatus],
    ) -> Result<TransitionOutcome, PipelineError> {
        let events = match reorder.handle(&command) {
            Ok(events) => events,
            Err(err) => return Ok(TransitionOutcome::Rejected(err)),
        };
        let mut updated = reorder.clone();
        for event in &events {
            updated.apply(event);
        }
        if self.db.update_reorder_if(&updated, allowed_from).await? {
            Ok(TransitionOutcome::Applied(updated))
        } else {
            Ok(TransitionOutcome::Stale)
        }
    }

    /// Tell the supplier the order is already settled, naming the stored
    /// status rather than whatever this duplicate event expected.
    async fn already_settled(
        &self,
        supplier: &Supplier,
        reorder_id: ReorderId,
    ) -> Result<(), PipelineError> {
        let status = self
            .db
            .get_reorder(reorder_id)
            .await?
            .map(|r| r.status().to_string())
            .unwrap_or_else(|| "settled".to_string());
        self.notify_supplier(supplier, format!("This order is already {status}."))
            .await;
        Ok(())
    }

    async fn resolve_sku(
        &self,
        store_id: StoreId,
        name: &str,
    ) -> Result<Option<Sku>, PipelineError> {
        if let Some(id) = self.sku_cache.get(store_id, name) {
            if let Some(sku) = self.db.get_sku(id).await? {
                return Ok(Some(sku));
            }
        }
        let candidates = self.db.skus_for_store(store_id).await?;
        match best_match(name, &candidates) {
            Some(sku) => {
                self.sku_cache.put(store_id, name, sku.id);
                Ok(Some(sku.clone()))
            }
            None => Ok(None),
        }
    }

    async fn adjust_stock(&self, sku: &Sku, delta: Decimal) -> Result<InventoryRecord, PipelineError> {
        let now = Utc::now();
        let current = self
            .db
            .inventory_for_sku(sku.id)
            .await?
            .unwrap_or_else(|| InventoryRecord::new(sku.id, Decimal::ZERO, now));
        let updated = current.apply_delta(delta, now);
        self.db.upsert_inventory(&updated).await?;
        Ok(updated)
    }

    /// Score current demand for a SKU and append the signal record.
    async fn evaluate_demand(&self, sku: &Sku) -> Result<DemandScore, PipelineError> {
        let now = Utc::now();
        let samples: Vec<LostSaleSample> = self
            .db
            .lost_sales_for_sku(sku.id)
            .await?
            .iter()
            .map(|l| {
                LostSaleSample::at(
                    l.requested_qty.to_f64().unwrap_or(0.0),
                    l.detected_at,
                    now,
                )
            })
            .collect();
        let score = self
            .demand_model
            .score(self.velocity, &samples, self.seasonality);
        self.db
            .append_signal(&DemandSignal::record(sku.id, &score, now))
            .await?;
        debug!(sku = %sku.name, score = score.score, "demand evaluated");
        Ok(score)
    }

    async fn reply(&self, store: &Store, body: impl Into<String>) {
        self.deliver(NotificationIntent::text(store.contact.clone(), body))
            .await;
    }

    async fn notify_supplier(&self, supplier: &Supplier, body: impl Into<String>) {
        self.deliver(NotificationIntent::text(supplier.contact.clone(), body))
            .await;
    }

    async fn deliver(&self, intent: NotificationIntent) {
        let delivered = if intent.choices.is_empty() {
            self.sender.send_text(&intent.to, &intent.body).await
        } else {
            self.sender
                .send_choice(&intent.to, &intent.body, &intent.choices)
                .await
        };
        if !delivered {
            warn!(to = %intent.to, "outbound delivery failed");
        }
    }
}

/// First positive number in the text, read as a unit price.
fn parse_price(text: &str) -> Option<Decimal> {
    text.split_whitespace()
        .filter_map(|word| {
            let trimmed = word.trim_matches(|c: char| !c.is_ascii_digit() && c != '.');
            Decimal::from_str(trimmed).ok()
        })
        .find(|price| *price > Decimal::ZERO)
}
