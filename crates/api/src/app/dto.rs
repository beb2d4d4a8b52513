//! Transport envelope DTOs.
//!
//! The channel provider wraps each message in a deeply nested
//! entry/changes/value envelope; everything downstream works on the flat
//! [`InboundMessage`] model, so the unwrap happens exactly once, here.

use serde::Deserialize;
use tracing::warn;

use dukaan_core::ChannelAddress;
use dukaan_messaging::{InboundMessage, MessageKind};

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    /// Absent for status-only notifications (delivered/read receipts).
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    pub from: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextPart>,
    pub button: Option<ButtonPart>,
    pub audio: Option<AudioPart>,
}

#[derive(Debug, Deserialize)]
pub struct TextPart {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ButtonPart {
    pub payload: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AudioPart {
    pub id: String,
    pub link: Option<String>,
}

impl WebhookPayload {
    /// Flatten the envelope into inbound messages, dropping entries the
    /// pipeline cannot address (bad sender address, missing body).
    pub fn into_messages(self) -> Vec<InboundMessage> {
        let mut out = Vec::new();
        for entry in self.entry {
            for change in entry.changes {
                for message in change.value.messages {
                    match map_message(message) {
                        Some(inbound) => out.push(inbound),
                        None => warn!("dropping unaddressable webhook message"),
                    }
                }
            }
        }
        out
    }
}

fn map_message(message: WebhookMessage) -> Option<InboundMessage> {
    let from = ChannelAddress::new(message.from).ok()?;
    let kind = match message.kind.as_str() {
        "text" => MessageKind::Text {
            body: message.text?.body,
        },
        "button" => {
            let button = message.button?;
            MessageKind::Button {
                id: button.payload,
                title: button.text,
            }
        }
        "audio" => {
            let audio = message.audio?;
            MessageKind::Audio {
                url: audio.link.unwrap_or(audio.id),
            }
        }
        other => MessageKind::Other {
            kind: other.to_string(),
        },
    };
    Some(InboundMessage { from, kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_text_message_from_envelope() {
        let raw = serde_json::json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "919876543210",
                            "type": "text",
                            "text": { "body": "add 10 kg rice" }
                        }]
                    }
                }]
            }]
        });
        let payload: WebhookPayload = serde_json::from_value(raw).unwrap();
        let messages = payload.into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from.as_str(), "919876543210");
        assert!(matches!(
            &messages[0].kind,
            MessageKind::Text { body } if body == "add 10 kg rice"
        ));
    }

    #[test]
    fn status_only_notification_yields_nothing() {
        let raw = serde_json::json!({
            "entry": [{ "changes": [{ "value": {} }] }]
        });
        let payload: WebhookPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.into_messages().is_empty());
    }

    #[test]
    fn unknown_kind_maps_to_other() {
        let raw = serde_json::json!({
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{ "from": "9111", "type": "image" }]
                    }
                }]
            }]
        });
        let payload: WebhookPayload = serde_json::from_value(raw).unwrap();
        let messages = payload.into_messages();
        assert!(matches!(
            &messages[0].kind,
            MessageKind::Other { kind } if kind == "image"
        ));
    }
}
