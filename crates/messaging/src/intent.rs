//! Structured output of the (external) intent classifier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dukaan_khata::KhataAction;

/// Owner-message intents the pipeline can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    StockUpdate,
    Reorder,
    LostSale,
    KhataUpdate,
    DeliveryConfirmation,
    Unknown,
}

/// Classifier extraction for a free-text owner message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentExtraction {
    pub intent: Intent,
    pub sku_name: Option<String>,
    pub quantity: Option<Decimal>,
    pub customer_name: Option<String>,
    /// Confidence in [0, 1]; low values are logged, not rejected.
    pub confidence: f64,
    pub reasoning: Option<String>,
    pub original_text: String,
}

impl IntentExtraction {
    /// Fallback extraction when classification fails or finds nothing.
    pub fn unknown(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            intent: Intent::Unknown,
            sku_name: None,
            quantity: None,
            customer_name: None,
            confidence: 0.0,
            reasoning: Some(reason.into()),
            original_text: text.into(),
        }
    }
}

/// Parsed khata (ledger) update from a free-text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KhataExtraction {
    pub customer_name: String,
    pub amount: Decimal,
    pub action: KhataAction,
    pub confidence: f64,
}
