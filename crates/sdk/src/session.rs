// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use eyre::{bail, Result};
use peak_config::ContractInfo;
use peak_evm_helpers::{SecurePeakContractFactory, SecurePeakRead, SecurePeakWrite};
use peak_fhevm::{FhevmInstance, WalletSigner};
use std::sync::{Arc, RwLock};
use tracing::info;

/// Predicates over the live wallet context, used as staleness guards.
///
/// A long-running operation captures the chain id and signer at entry and
/// re-checks both after every suspension point before committing results
/// to shared state. Both predicates compare against the current value at
/// call time, not a snapshot.
pub trait LiveContext: Send + Sync {
    fn same_chain(&self, expected: Option<u64>) -> bool;
    fn same_signer(&self, expected: Option<Address>) -> bool;
}

#[derive(Default)]
struct SessionInner {
    chain_id: Option<u64>,
    signer: Option<Arc<dyn WalletSigner>>,
    fhevm: Option<Arc<dyn FhevmInstance>>,
    reader: Option<Arc<dyn SecurePeakRead>>,
    writer: Option<Arc<dyn SecurePeakWrite>>,
}

/// The live wallet/provider context.
///
/// Setters model wallet events (connect, account switch, chain switch,
/// disconnect) and may fire while an operation is suspended; readers
/// always see the current value.
#[derive(Default)]
pub struct WalletSession {
    inner: RwLock<SessionInner>,
}

impl WalletSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.inner.read().unwrap().chain_id
    }

    pub fn signer(&self) -> Option<Arc<dyn WalletSigner>> {
        self.inner.read().unwrap().signer.clone()
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.inner
            .read()
            .unwrap()
            .signer
            .as_ref()
            .map(|signer| signer.address())
    }

    pub fn fhevm(&self) -> Option<Arc<dyn FhevmInstance>> {
        self.inner.read().unwrap().fhevm.clone()
    }

    pub fn reader(&self) -> Option<Arc<dyn SecurePeakRead>> {
        self.inner.read().unwrap().reader.clone()
    }

    pub fn writer(&self) -> Option<Arc<dyn SecurePeakWrite>> {
        self.inner.read().unwrap().writer.clone()
    }

    pub fn set_chain(&self, chain_id: Option<u64>) {
        self.inner.write().unwrap().chain_id = chain_id;
    }

    pub fn set_signer(&self, signer: Option<Arc<dyn WalletSigner>>) {
        self.inner.write().unwrap().signer = signer;
    }

    pub fn set_fhevm(&self, fhevm: Option<Arc<dyn FhevmInstance>>) {
        self.inner.write().unwrap().fhevm = fhevm;
    }

    pub fn set_reader(&self, reader: Option<Arc<dyn SecurePeakRead>>) {
        self.inner.write().unwrap().reader = reader;
    }

    pub fn set_writer(&self, writer: Option<Arc<dyn SecurePeakWrite>>) {
        self.inner.write().unwrap().writer = writer;
    }

    /// Connect to an RPC endpoint with a local private key, installing the
    /// chain id, signer, and read/write contracts for the resolved
    /// deployment. The FHEVM instance is wired separately via `set_fhevm`.
    pub async fn connect_http(
        &self,
        http_rpc_url: &str,
        private_key: &str,
        info: &ContractInfo,
    ) -> Result<()> {
        let (Some(address), Some(chain_id)) = (info.address, info.chain_id) else {
            bail!("no deployment for the active chain");
        };
        let address = address.to_string();

        let reader = SecurePeakContractFactory::create_read(http_rpc_url, &address).await?;
        let writer =
            SecurePeakContractFactory::create_write(http_rpc_url, &address, private_key).await?;
        let signer: PrivateKeySigner = private_key.parse()?;
        info!(chain_id, %address, "wallet session connected");

        self.set_chain(Some(chain_id));
        self.set_signer(Some(Arc::new(signer) as Arc<dyn WalletSigner>));
        self.set_reader(Some(Arc::new(reader) as Arc<dyn SecurePeakRead>));
        self.set_writer(Some(Arc::new(writer) as Arc<dyn SecurePeakWrite>));
        Ok(())
    }

    /// Drop the signer and the write contract, as on wallet disconnect.
    pub fn disconnect(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.signer = None;
        inner.writer = None;
    }
}

impl LiveContext for WalletSession {
    fn same_chain(&self, expected: Option<u64>) -> bool {
        self.chain_id() == expected
    }

    fn same_signer(&self, expected: Option<Address>) -> bool {
        self.signer_address() == expected
    }
}
