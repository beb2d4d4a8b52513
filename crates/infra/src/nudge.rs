//! Best-effort outbound delivery worker and the khata reminder sweep.
//!
//! State mutations never wait on the channel: handlers enqueue
//! `NotificationIntent`s and move on. The dispatcher drains the queue and
//! logs failures; a failed or dropped delivery never affects stored state.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use dukaan_messaging::{NotificationIntent, NotificationSender};

use crate::repos::Datastore;

/// Handle for enqueueing outbound messages. Cheap to clone; dropping every
/// clone stops the dispatcher after it drains.
#[derive(Clone)]
pub struct NudgeHandle {
    tx: mpsc::UnboundedSender<NotificationIntent>,
}

impl NudgeHandle {
    pub fn enqueue(&self, intent: NotificationIntent) {
        if self.tx.send(intent).is_err() {
            warn!("nudge dispatcher is gone, dropping outbound message");
        }
    }
}

/// Spawn the dispatcher task draining enqueued messages through `sender`.
pub fn spawn_dispatcher(
    sender: Arc<dyn NotificationSender>,
) -> (NudgeHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<NotificationIntent>();
    let task = tokio::spawn(async move {
        while let Some(intent) = rx.recv().await {
            let delivered = if intent.choices.is_empty() {
                sender.send_text(&intent.to, &intent.body).await
            } else {
                sender
                    .send_choice(&intent.to, &intent.body, &intent.choices)
                    .await
            };
            if delivered {
                debug!(to = %intent.to, "outbound message delivered");
            } else {
                warn!(to = %intent.to, "outbound message delivery failed");
            }
        }
    });
    (NudgeHandle { tx }, task)
}

/// Spawn the periodic khata reminder sweep.
///
/// Every `every`, customers whose positive balance has seen no payment for
/// `overdue_days` get one reminder enqueued. Storage errors end the tick, not
/// the task.
pub fn spawn_khata_sweep(
    db: Arc<dyn Datastore>,
    nudges: NudgeHandle,
    every: std::time::Duration,
    overdue_days: i64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = sweep_once(db.as_ref(), &nudges, overdue_days).await {
                warn!(error = %err, "khata reminder sweep failed");
            }
        }
    })
}

async fn sweep_once(
    db: &dyn Datastore,
    nudges: &NudgeHandle,
    overdue_days: i64,
) -> Result<(), crate::repos::RepoError> {
    let cutoff = Utc::now() - ChronoDuration::days(overdue_days);
    let overdue = db.overdue_ledgers(cutoff).await?;
    debug!(count = overdue.len(), "khata sweep found overdue ledgers");

    for ledger in overdue {
        let Some(customer) = db.get_customer(ledger.customer_id).await? else {
            continue;
        };
        let Some(contact) = customer.contact else {
            continue;
        };
        let body = format!(
            "Namaste {}! Gentle reminder: your khata balance is Rs {}. \
             Please clear it at your convenience.",
            customer.name, ledger.balance
        );
        nudges.enqueue(NotificationIntent::text(contact, body));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use dukaan_core::{ChannelAddress, CustomerId, StoreId};
    use dukaan_khata::LedgerBalance;
    use dukaan_parties::Customer;

    use crate::collaborators::RecordingSender;
    use crate::memory::InMemoryStore;
    use crate::repos::LedgerRepo;

    use super::*;

    #[tokio::test]
    async fn sweep_reminds_overdue_customers_with_contacts() {
        let db = InMemoryStore::new();
        let store_id = StoreId::new();

        let reachable = CustomerId::new();
        db.insert_customer(Customer {
            id: reachable,
            store_id,
            name: "Ramesh".to_string(),
            contact: Some(ChannelAddress::new("919900001111").unwrap()),
            created_at: Utc::now(),
        });
        db.upsert_ledger(&LedgerBalance {
            customer_id: reachable,
            balance: Decimal::from(750),
            last_payment_at: Some(Utc::now() - ChronoDuration::days(30)),
            lead_score: None,
        })
        .await
        .unwrap();

        // No contact on file, skipped silently.
        let unreachable = CustomerId::new();
        db.insert_customer(Customer {
            id: unreachable,
            store_id,
            name: "Suresh".to_string(),
            contact: None,
            created_at: Utc::now(),
        });
        db.upsert_ledger(&LedgerBalance {
            customer_id: unreachable,
            balance: Decimal::from(200),
            last_payment_at: None,
            lead_score: None,
        })
        .await
        .unwrap();

        // Recently paid, not overdue.
        let current = CustomerId::new();
        db.insert_customer(Customer {
            id: current,
            store_id,
            name: "Mahesh".to_string(),
            contact: Some(ChannelAddress::new("919900002222").unwrap()),
            created_at: Utc::now(),
        });
        db.upsert_ledger(&LedgerBalance {
            customer_id: current,
            balance: Decimal::from(100),
            last_payment_at: Some(Utc::now()),
            lead_score: None,
        })
        .await
        .unwrap();

        let sender = Arc::new(RecordingSender::new());
        let (nudges, dispatcher) = spawn_dispatcher(sender.clone());
        sweep_once(&db, &nudges, 15).await.unwrap();
        drop(nudges);
        dispatcher.await.unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.as_str(), "919900001111");
        assert!(sent[0].body.contains("Ramesh"));
        assert!(sent[0].body.contains("750"));
    }
}
