// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Consumption as seen by this client: an opaque ciphertext until a
/// decrypt reveals the clear value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ConsumptionValue {
    Encrypted,
    Clear(u64),
}

impl fmt::Display for ConsumptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumptionValue::Encrypted => write!(f, "******"),
            ConsumptionValue::Clear(value) => write!(f, "{value}"),
        }
    }
}

/// Local view of one on-chain record.
///
/// `encrypted` says whether the on-chain value is a ciphertext, while
/// `is_decrypted` says whether this session has revealed the plaintext;
/// a revealed record keeps `encrypted = true`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConsumptionRecord {
    pub id: u64,
    pub timestamp: String,
    pub consumption: ConsumptionValue,
    pub peak: bool,
    pub reason: String,
    pub encrypted: bool,
    pub is_decrypted: bool,
}

/// Time-series point parallel to the record list, for charting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConsumptionPoint {
    pub time: String,
    pub consumption: u64,
    pub encrypted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypted_consumption_renders_as_placeholder() {
        assert_eq!(ConsumptionValue::Encrypted.to_string(), "******");
        assert_eq!(ConsumptionValue::Clear(920).to_string(), "920");
    }
}
