// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod busy;
mod error;
mod models;
mod session;
mod store;

pub use error::StoreError;
pub use models::{ConsumptionPoint, ConsumptionRecord, ConsumptionValue};
pub use session::{LiveContext, WalletSession};
pub use store::PeakDataStore;

pub use peak_config::{ContractInfo, Deployment, DeploymentRegistry, StoreKeys};
pub use peak_data::{InMemoryStorage, SledStorage, StringStorage};

pub use peak_evm_helpers as evm_helpers;
pub use peak_fhevm as fhevm;
