// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{address, Address};
use peak_evm_helpers::{SecurePeakRead, SecurePeakWrite};
use peak_fhevm::{FhevmInstance, WalletSigner};
use peak_sdk::{DeploymentRegistry, InMemoryStorage, PeakDataStore, WalletSession};
use peak_test_helpers::{MockChain, MockFhevm, MockSigner};
use std::sync::Arc;

pub const CHAIN_ID: u64 = 31337;
pub const CONTRACT_ADDRESS: Address = address!("2910E325cf29dd912E3476B61ef12F49cb931096");
pub const ALICE: Address = Address::repeat_byte(0x11);
pub const BOB: Address = Address::repeat_byte(0x22);

pub struct Harness {
    pub session: Arc<WalletSession>,
    pub chain: MockChain,
    pub fhevm: Arc<MockFhevm>,
    pub signer: Arc<MockSigner>,
    pub storage: Arc<InMemoryStorage>,
    pub store: PeakDataStore,
}

/// A session connected to the builtin Hardhat deployment with Alice's
/// wallet, backed by a fresh mock chain and mock FHEVM instance.
pub fn connected_harness() -> Harness {
    let session = WalletSession::new();
    let chain = MockChain::new();
    let fhevm = MockFhevm::new();
    let signer = MockSigner::new(ALICE);
    let storage = Arc::new(InMemoryStorage::new());

    session.set_chain(Some(CHAIN_ID));
    session.set_signer(Some(signer.clone() as Arc<dyn WalletSigner>));
    session.set_fhevm(Some(fhevm.clone() as Arc<dyn FhevmInstance>));
    session.set_reader(Some(chain.reader() as Arc<dyn SecurePeakRead>));
    session.set_writer(Some(chain.writer(ALICE) as Arc<dyn SecurePeakWrite>));

    let store = PeakDataStore::new(
        session.clone(),
        DeploymentRegistry::builtin(),
        storage.clone(),
    );

    Harness {
        session,
        chain,
        fhevm,
        signer,
        storage,
        store,
    }
}

/// Rebind the session's wallet to another account on the same chain.
pub fn switch_wallet(harness: &Harness, account: Address) -> Arc<MockSigner> {
    let signer = MockSigner::new(account);
    harness
        .session
        .set_signer(Some(signer.clone() as Arc<dyn WalletSigner>));
    harness
        .session
        .set_writer(Some(harness.chain.writer(account) as Arc<dyn SecurePeakWrite>));
    signer
}
