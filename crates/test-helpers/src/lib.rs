// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod mock_chain;
mod mock_fhevm;
mod mock_signer;

pub use mock_chain::{MockChain, MockChainReader, MockChainWriter};
pub use mock_fhevm::MockFhevm;
pub use mock_signer::MockSigner;
