// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use eyre::{bail, eyre, Result};
use peak_fhevm::{
    Eip712Message, EncryptedInput, EncryptedInputBuilder, FhevmInstance, FhevmKeypair,
    HandleContractPair,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

type SuspendHook = Box<dyn Fn() + Send + Sync>;

/// Deterministic FHEVM instance: encryption stores the clear value under a
/// fresh handle, decryption looks it up again after checking that the
/// request is covered by the presented authorization.
///
/// The suspend hook runs at the start of every encrypt/decrypt call so
/// tests can flip the wallet context exactly at a suspension point.
#[derive(Default)]
pub struct MockFhevm {
    ciphertexts: Mutex<HashMap<B256, u64>>,
    counter: AtomicU64,
    suspend_hook: Mutex<Option<SuspendHook>>,
}

impl MockFhevm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_suspend_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.suspend_hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn clear_suspend_hook(&self) {
        *self.suspend_hook.lock().unwrap() = None;
    }

    /// Peek at the clear value behind a handle.
    pub fn plaintext_of(&self, handle: B256) -> Option<u64> {
        self.ciphertexts.lock().unwrap().get(&handle).copied()
    }

    fn suspend(&self) {
        if let Some(hook) = self.suspend_hook.lock().unwrap().as_ref() {
            hook();
        }
    }

    fn next_nonce(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl FhevmInstance for MockFhevm {
    fn generate_keypair(&self) -> FhevmKeypair {
        let secret = keccak256(format!("mock-fhevm-keypair-{}", self.next_nonce()));
        FhevmKeypair {
            public_key: format!("{:#x}", keccak256(secret)),
            private_key: format!("{secret:#x}"),
        }
    }

    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Eip712Message {
        let payload = serde_json::json!({
            "publicKey": public_key,
            "contractAddresses": contract_addresses,
            "startTimestamp": start_timestamp,
            "durationDays": duration_days,
        });
        let signing_hash = keccak256(payload.to_string().as_bytes());
        Eip712Message {
            domain: "SecurePeakUserDecrypt".to_string(),
            payload,
            signing_hash,
        }
    }

    async fn encrypt(&self, input: &EncryptedInputBuilder) -> Result<EncryptedInput> {
        self.suspend();
        let mut handles = Vec::new();
        let mut ciphertexts = self.ciphertexts.lock().unwrap();
        for value in input.values() {
            let handle = keccak256(format!(
                "{:#x}:{:#x}:{}",
                input.contract_address(),
                input.user_address(),
                self.next_nonce()
            ));
            ciphertexts.insert(handle, value.as_u64());
            handles.push(handle);
        }
        let mut proof_material = Vec::new();
        for handle in &handles {
            proof_material.extend_from_slice(handle.as_slice());
        }
        Ok(EncryptedInput {
            handles,
            input_proof: Bytes::from(keccak256(proof_material).to_vec()),
        })
    }

    async fn user_decrypt(
        &self,
        requests: &[HandleContractPair],
        private_key: &str,
        _public_key: &str,
        signature: &str,
        contract_addresses: &[Address],
        _user_address: Address,
        _start_timestamp: u64,
        _duration_days: u64,
    ) -> Result<HashMap<B256, u64>> {
        self.suspend();
        if signature.is_empty() || private_key.is_empty() {
            bail!("missing decryption authorization");
        }
        let ciphertexts = self.ciphertexts.lock().unwrap();
        let mut values = HashMap::new();
        for request in requests {
            if !contract_addresses.contains(&request.contract_address) {
                bail!(
                    "contract {} not covered by the authorization",
                    request.contract_address
                );
            }
            let value = ciphertexts
                .get(&request.handle)
                .copied()
                .ok_or_else(|| eyre!("unknown ciphertext handle {}", request.handle))?;
            values.insert(request.handle, value);
        }
        Ok(values)
    }
}
