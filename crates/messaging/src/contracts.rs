//! Collaborator contracts for the messaging boundary.
//!
//! These are the seams the application layer is wired against; adapters in
//! `dukaan-infra` (and test doubles) implement them. All of them may block on
//! IO and may fail independently per call.

use async_trait::async_trait;
use thiserror::Error;

use dukaan_core::ChannelAddress;

use crate::intent::{IntentExtraction, KhataExtraction};
use crate::notify::Choice;

/// Intent classification failure (model unavailable, unparseable output).
///
/// Callers degrade to `Intent::Unknown`; this error never crosses into state
/// mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier returned malformed output: {0}")]
    Malformed(String),
}

/// Black-box intent/entity extraction over free text.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<IntentExtraction, ClassifierError>;

    /// Second-stage extraction for khata updates (customer, amount,
    /// direction).
    async fn parse_khata(&self, text: &str) -> Result<KhataExtraction, ClassifierError>;
}

/// Speech-to-text collaborator. `None` means the audio is unprocessable; the
/// message is then acknowledged without any state change.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_url: &str) -> Option<String>;
}

/// Outbound delivery collaborator.
///
/// Returns plain success/failure; failures are logged by the caller and never
/// thrown back into the state machine.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_text(&self, to: &ChannelAddress, body: &str) -> bool;

    async fn send_choice(&self, to: &ChannelAddress, body: &str, options: &[Choice]) -> bool;
}
