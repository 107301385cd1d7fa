// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{FhevmInstance, WalletSigner};
use alloy::primitives::Address;
use chrono::Utc;
use peak_config::StoreKeys;
use peak_data::StringStorage;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SECONDS_PER_DAY: u64 = 86_400;
const MIN_DURATION_DAYS: u64 = 180;
const MAX_DURATION_DAYS: u64 = 365;

/// Reusable authorization for user decryption: an ephemeral keypair plus a
/// wallet signature over the contract set and a validity window.
///
/// Immutable once created; cached in the pluggable storage and borrowed by
/// the decrypt workflow for the duration of a call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DecryptionSignature {
    pub public_key: String,
    pub private_key: String,
    pub signature: String,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    pub start_timestamp: u64,
    pub duration_days: u64,
}

impl DecryptionSignature {
    pub fn storage_key(user: &Address, contract_addresses: &[Address]) -> String {
        StoreKeys::decryption_signature(user, contract_addresses)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp() as u64)
    }

    /// The window is closed at the start and open at the end.
    pub fn is_valid_at(&self, now: u64) -> bool {
        now >= self.start_timestamp
            && now < self.start_timestamp + self.duration_days * SECONDS_PER_DAY
    }

    fn covers(&self, user: &Address, contract_addresses: &[Address]) -> bool {
        if self.user_address != *user || self.contract_addresses.len() != contract_addresses.len()
        {
            return false;
        }
        contract_addresses
            .iter()
            .all(|address| self.contract_addresses.contains(address))
    }

    /// Load a cached signature for (signer, contract set) or request a
    /// fresh one from the wallet.
    ///
    /// The fast path returns the cached signature without any network
    /// call. Returns `None` when the signer refuses or signing fails;
    /// callers abort their decrypt flow on `None`.
    pub async fn load_or_sign(
        instance: &dyn FhevmInstance,
        contract_addresses: &[Address],
        signer: &dyn WalletSigner,
        storage: &dyn StringStorage,
    ) -> Option<Self> {
        let user = signer.address();
        let key = Self::storage_key(&user, contract_addresses);

        match storage.get_item(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Self>(&raw) {
                Ok(cached) if cached.is_valid() && cached.covers(&user, contract_addresses) => {
                    debug!(%user, "reusing cached decryption signature");
                    return Some(cached);
                }
                Ok(_) => debug!(%user, "cached decryption signature expired or mismatched"),
                Err(e) => warn!("Error parsing cached decryption signature: {e}"),
            },
            Ok(None) => {}
            Err(e) => warn!("Error reading decryption signature storage: {e}"),
        }

        let keypair = instance.generate_keypair();
        let start_timestamp = Utc::now().timestamp() as u64;
        let duration_days = rand::thread_rng().gen_range(MIN_DURATION_DAYS..=MAX_DURATION_DAYS);
        let eip712 = instance.create_eip712(
            &keypair.public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        );

        let signature = match signer.sign_hash(eip712.signing_hash).await {
            Ok(signature) => signature,
            Err(e) => {
                warn!("Signer declined decryption authorization: {e}");
                return None;
            }
        };

        let signed = Self {
            public_key: keypair.public_key,
            private_key: keypair.private_key,
            signature,
            contract_addresses: contract_addresses.to_vec(),
            user_address: user,
            start_timestamp,
            duration_days,
        };

        match serde_json::to_string(&signed) {
            Ok(raw) => {
                if let Err(e) = storage.set_item(&key, &raw).await {
                    warn!("Error caching decryption signature: {e}");
                }
            }
            Err(e) => warn!("Error serializing decryption signature: {e}"),
        }

        Some(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(start_timestamp: u64, duration_days: u64) -> DecryptionSignature {
        DecryptionSignature {
            public_key: "0xpub".to_string(),
            private_key: "0xpriv".to_string(),
            signature: "0xsig".to_string(),
            contract_addresses: vec![Address::repeat_byte(0xaa)],
            user_address: Address::repeat_byte(0x11),
            start_timestamp,
            duration_days,
        }
    }

    #[test]
    fn window_is_closed_at_start_open_at_end() {
        let sig = signature(1_000, 2);
        assert!(!sig.is_valid_at(999));
        assert!(sig.is_valid_at(1_000));
        assert!(sig.is_valid_at(1_000 + 2 * SECONDS_PER_DAY - 1));
        assert!(!sig.is_valid_at(1_000 + 2 * SECONDS_PER_DAY));
    }

    #[test]
    fn covers_is_order_insensitive() {
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);
        let mut sig = signature(0, 1);
        sig.contract_addresses = vec![a, b];

        let user = sig.user_address;
        assert!(sig.covers(&user, &[b, a]));
        assert!(!sig.covers(&user, &[a]));
        assert!(!sig.covers(&Address::repeat_byte(0x22), &[a, b]));
    }

    #[test]
    fn serde_round_trips_through_json() {
        let sig = signature(42, 365);
        let raw = serde_json::to_string(&sig).unwrap();
        let parsed: DecryptionSignature = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, sig);
    }
}
