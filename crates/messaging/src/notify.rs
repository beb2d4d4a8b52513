//! Outbound notification intents.
//!
//! The pipeline mutates state first, then emits a list of these as a
//! separate, independently-retried step. Delivery is best-effort: a failed
//! send is recorded but never rolls back the transition that produced it.

use serde::{Deserialize, Serialize};

use dukaan_core::ChannelAddress;

/// One interactive button choice offered with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Intent to deliver one message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub to: ChannelAddress,
    pub body: String,
    /// Empty for plain text messages.
    pub choices: Vec<Choice>,
}

impl NotificationIntent {
    pub fn text(to: ChannelAddress, body: impl Into<String>) -> Self {
        Self {
            to,
            body: body.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices(to: ChannelAddress, body: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            to,
            body: body.into(),
            choices,
        }
    }
}
