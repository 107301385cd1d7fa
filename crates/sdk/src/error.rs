// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

/// Errors surfaced by the record store operations.
///
/// Staleness and signing refusal are not errors; they end an operation
/// early with a status message only.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A precondition failed before any network call was made.
    #[error("contract or signer not available")]
    NotAvailable,

    /// A contract, network, or FHEVM call failed mid-operation. The status
    /// message carries the same text for the presentation layer; contract
    /// revert reasons pass through unchanged.
    #[error("{0}")]
    Chain(eyre::Report),
}

impl From<eyre::Report> for StoreError {
    fn from(report: eyre::Report) -> Self {
        StoreError::Chain(report)
    }
}
