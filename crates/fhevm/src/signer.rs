// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    hex,
    primitives::{Address, B256},
    signers::{local::PrivateKeySigner, Signer},
};
use async_trait::async_trait;
use eyre::Result;

/// Narrow wallet seam used for decryption-authorization requests.
///
/// Real wallets may refuse to sign; refusal surfaces as an error here and
/// as `None` from `DecryptionSignature::load_or_sign`.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn address(&self) -> Address;

    async fn sign_hash(&self, hash: B256) -> Result<String>;
}

#[async_trait]
impl WalletSigner for PrivateKeySigner {
    fn address(&self) -> Address {
        Signer::address(self)
    }

    async fn sign_hash(&self, hash: B256) -> Result<String> {
        let signature = Signer::sign_hash(self, &hash).await?;
        Ok(hex::encode_prefixed(signature.as_bytes()))
    }
}
