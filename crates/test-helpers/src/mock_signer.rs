// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{keccak256, Address, B256};
use async_trait::async_trait;
use eyre::{bail, Result};
use peak_fhevm::WalletSigner;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

/// Wallet signer double that counts signature requests and can be told to
/// refuse them, simulating a user rejecting the wallet prompt.
pub struct MockSigner {
    address: Address,
    refusing: AtomicBool,
    signatures_requested: AtomicU64,
}

impl MockSigner {
    pub fn new(address: Address) -> Arc<Self> {
        Arc::new(Self {
            address,
            refusing: AtomicBool::new(false),
            signatures_requested: AtomicU64::new(0),
        })
    }

    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }

    pub fn signatures_requested(&self) -> u64 {
        self.signatures_requested.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_hash(&self, hash: B256) -> Result<String> {
        if self.refusing.load(Ordering::SeqCst) {
            bail!("user rejected the signature request");
        }
        self.signatures_requested.fetch_add(1, Ordering::SeqCst);
        let material = [self.address.as_slice(), hash.as_slice()].concat();
        Ok(format!("{:#x}", keccak256(material)))
    }
}
