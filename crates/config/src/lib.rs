// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod deployments;
mod store_keys;

pub use deployments::{ContractInfo, Deployment, DeploymentRegistry};
pub use store_keys::StoreKeys;
