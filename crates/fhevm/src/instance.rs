// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Eip712Message, EncryptedInput, EncryptedInputBuilder, FhevmKeypair, HandleContractPair};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use eyre::Result;
use std::collections::HashMap;

/// Client-side FHEVM primitive.
///
/// Encryption and user decryption are remote calls on real backends, so
/// both are suspension points; callers re-validate their captured context
/// after each await before touching shared state.
#[async_trait]
pub trait FhevmInstance: Send + Sync {
    /// Start collecting clear values bound to (contract, user).
    fn create_encrypted_input(
        &self,
        contract_address: Address,
        user_address: Address,
    ) -> EncryptedInputBuilder {
        EncryptedInputBuilder::new(contract_address, user_address)
    }

    /// Generate an ephemeral keypair for user decryption.
    fn generate_keypair(&self) -> FhevmKeypair;

    /// Build the EIP-712 payload authorizing decryption for the given
    /// contract set and validity window.
    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Eip712Message;

    /// Encrypt the staged values into ciphertext handles plus one proof.
    async fn encrypt(&self, input: &EncryptedInputBuilder) -> Result<EncryptedInput>;

    /// Decrypt handles under a previously signed authorization, returning
    /// the clear value for every requested handle.
    #[allow(clippy::too_many_arguments)]
    async fn user_decrypt(
        &self,
        requests: &[HandleContractPair],
        private_key: &str,
        public_key: &str,
        signature: &str,
        contract_addresses: &[Address],
        user_address: Address,
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<HashMap<B256, u64>>;
}
