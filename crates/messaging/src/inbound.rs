use serde::{Deserialize, Serialize};

use dukaan_core::ChannelAddress;

/// One inbound channel event, already unwrapped from the transport envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub from: ChannelAddress,
    pub kind: MessageKind,
}

/// Shape of an inbound message.
///
/// Anything outside text/button/audio is carried as `Other` and acknowledged
/// as a no-op downstream; unknown kinds are never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum MessageKind {
    Text { body: String },
    Button { id: String, title: Option<String> },
    Audio { url: String },
    Other { kind: String },
}

impl InboundMessage {
    pub fn text(from: ChannelAddress, body: impl Into<String>) -> Self {
        Self {
            from,
            kind: MessageKind::Text { body: body.into() },
        }
    }

    pub fn button(from: ChannelAddress, id: impl Into<String>) -> Self {
        Self {
            from,
            kind: MessageKind::Button {
                id: id.into(),
                title: None,
            },
        }
    }
}
