//! Email identity keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower-cased email used as the identity key for OTP entries, sessions and
/// the admin allow-list.
///
/// Normalization is lower-casing only: surrounding whitespace is kept, so
/// `" a@x.com"` and `"a@x.com"` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn normalize(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Case-insensitive comparison ignoring surrounding whitespace.
    ///
    /// Used for the "cannot remove yourself" admin check, where the caller
    /// typed the address by hand.
    pub fn same_address(&self, raw: &str) -> bool {
        self.0.trim() == raw.trim().to_lowercase()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Email {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}
