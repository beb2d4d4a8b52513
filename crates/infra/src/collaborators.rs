//! Channel collaborator adapters.
//!
//! The deployable chat/SLM/speech vendors plug in behind the
//! `dukaan-messaging` contracts. What lives here are the local adapters: a
//! logging sender, a recording sender for tests, a keyword classifier that
//! serves as the deterministic dev stand-in for the hosted model, and a fixed
//! transcriber.

use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use dukaan_core::ChannelAddress;
use dukaan_khata::KhataAction;
use dukaan_messaging::{
    Choice, ClassifierError, Intent, IntentClassifier, IntentExtraction, KhataExtraction,
    NotificationIntent, NotificationSender, Transcriber,
};

/// Sender that logs instead of delivering. Default for local runs without
/// channel credentials.
#[derive(Debug, Default)]
pub struct TracingSender;

#[async_trait]
impl NotificationSender for TracingSender {
    async fn send_text(&self, to: &ChannelAddress, body: &str) -> bool {
        info!(to = %to, body, "outbound text (not delivered, tracing sender)");
        true
    }

    async fn send_choice(&self, to: &ChannelAddress, body: &str, options: &[Choice]) -> bool {
        info!(
            to = %to,
            body,
            options = options.len(),
            "outbound choice message (not delivered, tracing sender)"
        );
        true
    }
}

/// Sender that records every outbound intent. Test observation point.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<NotificationIntent>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationIntent> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Take everything recorded so far, leaving the log empty.
    pub fn drain(&self) -> Vec<NotificationIntent> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send_text(&self, to: &ChannelAddress, body: &str) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(NotificationIntent::text(to.clone(), body));
        true
    }

    async fn send_choice(&self, to: &ChannelAddress, body: &str, options: &[Choice]) -> bool {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(NotificationIntent::with_choices(
                to.clone(),
                body,
                options.to_vec(),
            ));
        true
    }
}

/// Deterministic keyword classifier.
///
/// Stand-in for the hosted extraction model in dev and tests. Heuristics only;
/// anything it cannot place comes back as `Intent::Unknown` rather than a
/// guess with fake confidence.
#[derive(Debug, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn first_number(text: &str) -> Option<Decimal> {
        text.split_whitespace()
            .find_map(|word| Decimal::from_str(word.trim_matches(|c: char| !c.is_ascii_digit() && c != '.')).ok())
    }

    /// Words left after dropping numbers and the trigger keywords.
    fn residual_words(text: &str) -> Option<String> {
        const KEYWORDS: &[&str] = &[
            "stock", "update", "add", "received", "reorder", "order", "out", "of", "khatam",
            "finished", "lost", "asked", "for", "wanted", "customer", "khata", "paid", "payment",
            "credit", "udhar", "delivered", "delivery", "kg", "units", "packets",
        ];
        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|w| {
                let lower = w.to_lowercase();
                Self::first_number(w).is_none() && !KEYWORDS.contains(&lower.as_str())
            })
            .collect();
        if words.is_empty() {
            None
        } else {
            Some(words.join(" "))
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<IntentExtraction, ClassifierError> {
        let lower = text.to_lowercase();
        let intent = if lower.contains("khata")
            || lower.contains("paid")
            || lower.contains("payment")
            || lower.contains("udhar")
        {
            Intent::KhataUpdate
        } else if lower.contains("reorder") || lower.contains("order") {
            Intent::Reorder
        } else if lower.contains("out of stock")
            || lower.contains("khatam")
            || lower.contains("asked for")
            || lower.contains("lost")
        {
            Intent::LostSale
        } else if lower.contains("delivered") || lower.contains("delivery") {
            Intent::DeliveryConfirmation
        } else if lower.contains("stock") || lower.contains("add") || lower.contains("received") {
            Intent::StockUpdate
        } else {
            return Ok(IntentExtraction::unknown(text, "no trigger keyword"));
        };

        Ok(IntentExtraction {
            intent,
            sku_name: Self::residual_words(text),
            quantity: Self::first_number(text),
            customer_name: None,
            confidence: 0.7,
            reasoning: Some("keyword heuristic".to_string()),
            original_text: text.to_string(),
        })
    }

    async fn parse_khata(&self, text: &str) -> Result<KhataExtraction, ClassifierError> {
        let amount = Self::first_number(text).ok_or_else(|| {
            ClassifierError::Malformed("khata update without an amount".to_string())
        })?;
        let lower = text.to_lowercase();
        let action = if lower.contains("paid") || lower.contains("payment") || lower.contains("received")
        {
            KhataAction::PaymentReceived
        } else {
            KhataAction::CreditGiven
        };
        let customer_name = Self::residual_words(text)
            .ok_or_else(|| ClassifierError::Malformed("khata update without a name".to_string()))?;

        Ok(KhataExtraction {
            customer_name,
            amount,
            action,
            confidence: 0.7,
        })
    }
}

/// Transcriber returning a configured transcript, or `None` when built
/// unavailable. Dev/test adapter.
#[derive(Debug, Default)]
pub struct FixedTranscriber {
    text: Option<String>,
}

impl FixedTranscriber {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio_url: &str) -> Option<String> {
        self.text.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keyword_classifier_extracts_stock_update() {
        let extraction = KeywordClassifier::new()
            .classify("add 10 kg basmati rice stock")
            .await
            .unwrap();
        assert_eq!(extraction.intent, Intent::StockUpdate);
        assert_eq!(extraction.quantity, Some(Decimal::from(10)));
        assert_eq!(extraction.sku_name.as_deref(), Some("basmati rice"));
    }

    #[tokio::test]
    async fn keyword_classifier_falls_back_to_unknown() {
        let extraction = KeywordClassifier::new()
            .classify("namaste bhai")
            .await
            .unwrap();
        assert_eq!(extraction.intent, Intent::Unknown);
        assert_eq!(extraction.confidence, 0.0);
    }

    #[tokio::test]
    async fn keyword_classifier_parses_khata_payment() {
        let parsed = KeywordClassifier::new()
            .parse_khata("Ramesh paid 500")
            .await
            .unwrap();
        assert_eq!(parsed.customer_name, "Ramesh");
        assert_eq!(parsed.amount, Decimal::from(500));
        assert_eq!(parsed.action, KhataAction::PaymentReceived);
    }
}
