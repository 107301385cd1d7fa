// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// Ephemeral keypair generated by the FHEVM instance for user decryption.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FhevmKeypair {
    pub public_key: String,
    pub private_key: String,
}

/// A clear value staged for encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearValue {
    Bool(bool),
    U32(u32),
    U64(u64),
}

impl ClearValue {
    pub fn as_u64(&self) -> u64 {
        match *self {
            ClearValue::Bool(value) => value as u64,
            ClearValue::U32(value) => value as u64,
            ClearValue::U64(value) => value,
        }
    }
}

/// Collects typed clear values bound to one (contract, user) pair.
/// `FhevmInstance::encrypt` turns the staged values into ciphertext
/// handles plus a shared input proof.
#[derive(Debug, Clone)]
pub struct EncryptedInputBuilder {
    contract_address: Address,
    user_address: Address,
    values: Vec<ClearValue>,
}

impl EncryptedInputBuilder {
    pub fn new(contract_address: Address, user_address: Address) -> Self {
        Self {
            contract_address,
            user_address,
            values: Vec::new(),
        }
    }

    pub fn add_bool(&mut self, value: bool) -> &mut Self {
        self.values.push(ClearValue::Bool(value));
        self
    }

    pub fn add32(&mut self, value: u32) -> &mut Self {
        self.values.push(ClearValue::U32(value));
        self
    }

    pub fn add64(&mut self, value: u64) -> &mut Self {
        self.values.push(ClearValue::U64(value));
        self
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn user_address(&self) -> Address {
        self.user_address
    }

    pub fn values(&self) -> &[ClearValue] {
        &self.values
    }
}

/// Ciphertext handles plus the shared input proof produced by one
/// `encrypt` call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EncryptedInput {
    pub handles: Vec<B256>,
    pub input_proof: Bytes,
}

/// One handle to decrypt together with the contract it lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleContractPair {
    pub handle: B256,
    pub contract_address: Address,
}

/// EIP-712 payload prepared by the instance for the wallet to sign.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Eip712Message {
    pub domain: String,
    pub payload: serde_json::Value,
    pub signing_hash: B256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_stages_values_in_order() {
        let contract = Address::repeat_byte(0xaa);
        let user = Address::repeat_byte(0xbb);
        let mut input = EncryptedInputBuilder::new(contract, user);
        input.add32(920).add_bool(true).add64(7);

        assert_eq!(input.contract_address(), contract);
        assert_eq!(input.user_address(), user);
        assert_eq!(
            input.values(),
            &[
                ClearValue::U32(920),
                ClearValue::Bool(true),
                ClearValue::U64(7)
            ]
        );
        assert_eq!(input.values()[1].as_u64(), 1);
    }
}
