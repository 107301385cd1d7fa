// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{address, Address};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A known SecurePeakData deployment on one chain.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct Deployment {
    pub address: Address,
    pub chain_id: u64,
    pub chain_name: String,
}

/// Contract metadata resolved for the active chain.
///
/// Recomputed whenever the chain id changes; immutable within one
/// resolution. A missing `address` means the caller must report the
/// contract as not deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContractInfo {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub chain_name: Option<String>,
}

impl ContractInfo {
    pub fn is_deployed(&self) -> bool {
        matches!(self.address, Some(address) if address != Address::ZERO)
    }
}

/// Static table of known deployments keyed by chain id.
///
/// An all-zero address marks a chain where the contract is not yet
/// deployed; `resolve` treats it the same as an unknown chain.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeploymentRegistry {
    deployments: HashMap<u64, Deployment>,
}

impl DeploymentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The deployments shipped by the project's deploy scripts.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(Deployment {
            address: address!("2910E325cf29dd912E3476B61ef12F49cb931096"),
            chain_id: 31337,
            chain_name: "Hardhat".to_string(),
        });
        registry.insert(Deployment {
            // Pending deployment, zero sentinel
            address: Address::ZERO,
            chain_id: 11155111,
            chain_name: "Sepolia".to_string(),
        });
        registry
    }

    /// Load a registry from a JSON array of deployments.
    pub fn from_json(raw: &str) -> Result<Self> {
        let deployments: Vec<Deployment> = serde_json::from_str(raw)?;
        let mut registry = Self::new();
        for deployment in deployments {
            registry.insert(deployment);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, deployment: Deployment) {
        self.deployments.insert(deployment.chain_id, deployment);
    }

    /// Resolve contract metadata for the given chain id.
    ///
    /// With no chain id only the empty info is returned. An unknown chain,
    /// or one recorded with the zero sentinel, yields an info carrying the
    /// chain id but no usable address.
    pub fn resolve(&self, chain_id: Option<u64>) -> ContractInfo {
        let Some(chain_id) = chain_id else {
            return ContractInfo::default();
        };

        match self.deployments.get(&chain_id) {
            Some(deployment) if deployment.address != Address::ZERO => ContractInfo {
                address: Some(deployment.address),
                chain_id: Some(deployment.chain_id),
                chain_name: Some(deployment.chain_name.clone()),
            },
            _ => {
                debug!(chain_id, "no usable deployment for chain");
                ContractInfo {
                    address: None,
                    chain_id: Some(chain_id),
                    chain_name: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_without_chain_id_carries_nothing() {
        let info = DeploymentRegistry::builtin().resolve(None);
        assert_eq!(info.address, None);
        assert_eq!(info.chain_id, None);
        assert!(!info.is_deployed());
    }

    #[test]
    fn resolve_unknown_chain_keeps_chain_id_without_address() {
        let info = DeploymentRegistry::builtin().resolve(Some(424242));
        assert_eq!(info.address, None);
        assert_eq!(info.chain_id, Some(424242));
        assert!(!info.is_deployed());
    }

    #[test]
    fn zero_sentinel_reads_as_not_deployed() {
        let info = DeploymentRegistry::builtin().resolve(Some(11155111));
        assert_eq!(info.address, None);
        assert_eq!(info.chain_id, Some(11155111));
        assert!(!info.is_deployed());
    }

    #[test]
    fn known_deployment_resolves_fully() {
        let info = DeploymentRegistry::builtin().resolve(Some(31337));
        assert_eq!(
            info.address,
            Some(address!("2910E325cf29dd912E3476B61ef12F49cb931096"))
        );
        assert_eq!(info.chain_id, Some(31337));
        assert_eq!(info.chain_name.as_deref(), Some("Hardhat"));
        assert!(info.is_deployed());
    }

    #[test]
    fn from_json_loads_deployments() {
        let raw = r#"[
            {
                "address": "0x00000000000000000000000000000000000000aa",
                "chain_id": 1337,
                "chain_name": "Local"
            }
        ]"#;
        let registry = DeploymentRegistry::from_json(raw).unwrap();
        let info = registry.resolve(Some(1337));
        assert!(info.is_deployed());
        assert_eq!(info.chain_name.as_deref(), Some("Local"));
    }
}
