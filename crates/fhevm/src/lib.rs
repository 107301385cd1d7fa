// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod instance;
mod signature;
mod signer;
mod types;

pub use instance::FhevmInstance;
pub use signature::DecryptionSignature;
pub use signer::WalletSigner;
pub use types::{
    ClearValue, Eip712Message, EncryptedInput, EncryptedInputBuilder, FhevmKeypair,
    HandleContractPair,
};
