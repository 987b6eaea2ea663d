//! WhatsApp relay addresses.

use std::fmt;

use crate::error::{RelayError, Result};

/// Suffix the driver uses for individual chats.
pub const CHAT_SUFFIX: &str = "@c.us";

/// A digits-only phone address: country code (no `+`) followed by the local
/// number, e.g. `15550100`.
///
/// Displays in driver form (`15550100@c.us`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelayAddress(String);

impl RelayAddress {
    /// Compose the address of a client from its country code and phone.
    ///
    /// Only the first `+` of the country code is removed.
    pub fn for_client(country_code: &str, phone: &str) -> Self {
        Self(format!("{}{}", country_code.trim().replacen('+', "", 1), phone.trim()))
    }

    /// Parse a driver chat id such as `15550100@c.us`.
    pub fn parse(chat_id: &str) -> Result<Self> {
        let digits = chat_id.trim();
        let digits = digits.strip_suffix(CHAT_SUFFIX).unwrap_or(digits);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(RelayError::InvalidAddress(chat_id.to_string()));
        }

        Ok(Self(digits.to_string()))
    }

    /// The bare digits.
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// The driver chat id (`<digits>@c.us`).
    pub fn chat_id(&self) -> String {
        format!("{}{}", self.0, CHAT_SUFFIX)
    }
}

impl fmt::Display for RelayAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, CHAT_SUFFIX)
    }
}
