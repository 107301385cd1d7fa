// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{keccak256, Address};

pub struct StoreKeys;

impl StoreKeys {
    /// Key for a cached user-decryption signature, scoped to the signer and
    /// the exact contract set it authorizes. Address order is not
    /// significant.
    pub fn decryption_signature(user: &Address, contract_addresses: &[Address]) -> String {
        let mut sorted: Vec<String> = contract_addresses
            .iter()
            .map(|address| format!("{address:#x}"))
            .collect();
        sorted.sort();
        let digest = keccak256(sorted.join(",").as_bytes());
        format!("//fhevm/decryption_signature/{user:#x}/{digest:#x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable_under_address_reordering() {
        let user = Address::repeat_byte(0x11);
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);
        assert_eq!(
            StoreKeys::decryption_signature(&user, &[a, b]),
            StoreKeys::decryption_signature(&user, &[b, a])
        );
    }

    #[test]
    fn key_differs_per_user_and_contract_set() {
        let a = Address::repeat_byte(0xaa);
        let b = Address::repeat_byte(0xbb);
        let alice = Address::repeat_byte(0x11);
        let bob = Address::repeat_byte(0x22);
        assert_ne!(
            StoreKeys::decryption_signature(&alice, &[a]),
            StoreKeys::decryption_signature(&bob, &[a])
        );
        assert_ne!(
            StoreKeys::decryption_signature(&alice, &[a]),
            StoreKeys::decryption_signature(&alice, &[b])
        );
    }
}
