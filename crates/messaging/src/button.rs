//! Typed parsing of interactive button payloads.
//!
//! The wire format is `action_orderId` (e.g. `approve_0192…`). It is parsed
//! exactly once, at the boundary, into a tagged action; nothing downstream
//! ever re-splits the string.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dukaan_core::ReorderId;

/// A supplier's button tap, resolved to an action on one reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Approve(ReorderId),
    UpdatePrice(ReorderId),
    Decline(ReorderId),
    GenerateBill(ReorderId),
}

impl ButtonAction {
    pub fn reorder_id(&self) -> ReorderId {
        match self {
            ButtonAction::Approve(id)
            | ButtonAction::UpdatePrice(id)
            | ButtonAction::Decline(id)
            | ButtonAction::GenerateBill(id) => *id,
        }
    }

    /// Wire payload for outbound button choices.
    pub fn payload(&self) -> String {
        match self {
            ButtonAction::Approve(id) => format!("approve_{id}"),
            ButtonAction::UpdatePrice(id) => format!("update_{id}"),
            ButtonAction::Decline(id) => format!("decline_{id}"),
            ButtonAction::GenerateBill(id) => format!("genbill_{id}"),
        }
    }
}

/// Malformed button payload, a distinct and recoverable error kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ButtonParseError {
    #[error("button payload has no order id: {0}")]
    MissingOrderId(String),

    #[error("unknown button action: {0}")]
    UnknownAction(String),

    #[error("invalid order id in button payload: {0}")]
    InvalidOrderId(String),
}

impl FromStr for ButtonAction {
    type Err = ButtonParseError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let (action, raw_id) = payload
            .split_once('_')
            .ok_or_else(|| ButtonParseError::MissingOrderId(payload.to_string()))?;

        let id = ReorderId::from_str(raw_id)
            .map_err(|_| ButtonParseError::InvalidOrderId(raw_id.to_string()))?;

        match action {
            "approve" => Ok(ButtonAction::Approve(id)),
            "update" => Ok(ButtonAction::UpdatePrice(id)),
            "decline" => Ok(ButtonAction::Decline(id)),
            "genbill" => Ok(ButtonAction::GenerateBill(id)),
            other => Err(ButtonParseError::UnknownAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_actions() {
        let id = ReorderId::new();

        for (payload, expected) in [
            (format!("approve_{id}"), ButtonAction::Approve(id)),
            (format!("update_{id}"), ButtonAction::UpdatePrice(id)),
            (format!("decline_{id}"), ButtonAction::Decline(id)),
            (format!("genbill_{id}"), ButtonAction::GenerateBill(id)),
        ] {
            assert_eq!(payload.parse::<ButtonAction>().unwrap(), expected);
        }
    }

    #[test]
    fn round_trips_through_payload() {
        let action = ButtonAction::Decline(ReorderId::new());
        assert_eq!(action.payload().parse::<ButtonAction>().unwrap(), action);
    }

    #[test]
    fn missing_separator_is_missing_order_id() {
        let err = "approve".parse::<ButtonAction>().unwrap_err();
        assert!(matches!(err, ButtonParseError::MissingOrderId(_)));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let payload = format!("snooze_{}", ReorderId::new());
        let err = payload.parse::<ButtonAction>().unwrap_err();
        assert!(matches!(err, ButtonParseError::UnknownAction(_)));
    }

    #[test]
    fn garbage_order_id_is_rejected() {
        let err = "approve_not-a-uuid".parse::<ButtonAction>().unwrap_err();
        assert!(matches!(err, ButtonParseError::InvalidOrderId(_)));
    }
}
