// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod contracts;

pub use contracts::{
    PeakReadOnlyProvider, PeakWriteProvider, ProviderType, ReadOnly, ReadWrite, RecordMetadata,
    SecurePeakContract, SecurePeakContractFactory, SecurePeakData, SecurePeakRead,
    SecurePeakReadContract, SecurePeakWrite, SecurePeakWriteContract, TxOutcome,
};
