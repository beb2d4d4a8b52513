//! Chat-channel address value type.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Address of a party on the messaging channel (e.g. a phone number in
/// international format, no `+`).
///
/// Compared by normalized value: surrounding whitespace is stripped at
/// construction. Sender classification matches on this exact value, so
/// registration and inbound events must use the same formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelAddress(String);

impl ChannelAddress {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let value = raw.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::validation("channel address must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let a = ChannelAddress::new(" 919876543210 ").unwrap();
        assert_eq!(a.as_str(), "919876543210");
    }

    #[test]
    fn rejects_empty() {
        assert!(ChannelAddress::new("  ").is_err());
    }
}
