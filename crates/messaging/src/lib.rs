//! Messaging boundary module.
//!
//! Everything that crosses the chat channel: the inbound event model, the
//! typed button payloads, intent-extraction types, outbound notification
//! intents, and the collaborator contracts (classifier, transcriber, sender)
//! the application layer is wired against. No IO here; adapters live in
//! `dukaan-infra`.

pub mod button;
pub mod contracts;
pub mod inbound;
pub mod intent;
pub mod notify;

pub use button::{ButtonAction, ButtonParseError};
pub use contracts::{ClassifierError, IntentClassifier, NotificationSender, Transcriber};
pub use inbound::{InboundMessage, MessageKind};
pub use intent::{Intent, IntentExtraction, KhataExtraction};
pub use notify::{Choice, NotificationIntent};
