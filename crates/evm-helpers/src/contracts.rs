// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::providers::fillers::BlobGasFiller;
use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, B256, U256},
    providers::fillers::{
        ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
    },
    providers::{Identity, ProviderBuilder, RootProvider},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract SecurePeakData {
        function getRecordCount() external view returns (uint256 count);
        function getRecordMetadata(uint256 recordId) external view returns (uint256 timestamp, address submitter, bool exists);
        function getRecordConsumption(uint256 recordId) external view returns (bytes32 handle);
        function getRecordIsPeak(uint256 recordId) external view returns (bytes32 handle);
        function getUserRecordIds(address user) external view returns (uint256[] memory recordIds);
        function createRecord(bytes32 consumptionHandle, bytes calldata consumptionProof, bytes32 isPeakHandle, bytes calldata isPeakProof) external;
        function updateConsumption(uint256 recordId, bytes32 consumptionHandle, bytes calldata consumptionProof) external;
    }
}

/// Per-record metadata kept in clear on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordMetadata {
    pub timestamp: U256,
    pub submitter: Address,
    pub exists: bool,
}

/// Summary of a mined transaction; the part of the receipt the workflow
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TxOutcome {
    pub transaction_hash: B256,
    pub status: bool,
}

impl From<&TransactionReceipt> for TxOutcome {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            status: receipt.status(),
        }
    }
}

/// Trait for read-only operations on the SecurePeakData contract
#[async_trait]
pub trait SecurePeakRead: Send + Sync {
    /// Get the total number of records ever created
    async fn get_record_count(&self) -> Result<U256>;

    /// Get the clear metadata of a record
    async fn get_record_metadata(&self, record_id: U256) -> Result<RecordMetadata>;

    /// Get the ciphertext handle of a record's consumption value
    async fn get_record_consumption(&self, record_id: U256) -> Result<B256>;

    /// Get the ciphertext handle of a record's peak flag
    async fn get_record_is_peak(&self, record_id: U256) -> Result<B256>;

    /// Get the ids of all records submitted by a user
    async fn get_user_record_ids(&self, user: Address) -> Result<Vec<U256>>;
}

/// Trait for write operations on the SecurePeakData contract
#[async_trait]
pub trait SecurePeakWrite: Send + Sync {
    /// Create a record from two ciphertext handles and their proofs
    async fn create_record(
        &self,
        consumption_handle: B256,
        consumption_proof: Bytes,
        is_peak_handle: B256,
        is_peak_proof: Bytes,
    ) -> Result<TxOutcome>;

    /// Replace a record's consumption ciphertext; reverts unless the caller
    /// is the original submitter
    async fn update_consumption(
        &self,
        record_id: U256,
        consumption_handle: B256,
        consumption_proof: Bytes,
    ) -> Result<TxOutcome>;
}

/// Generic type to represent different provider types
pub trait ProviderType: Send {
    type Provider: alloy::providers::Provider + Send + Sync + 'static;
}

/// Marker type for read-only provider
#[derive(Clone)]
pub struct ReadOnly;
impl ProviderType for ReadOnly {
    type Provider = PeakReadOnlyProvider;
}
/// Marker type for read-write provider
#[derive(Clone)]
pub struct ReadWrite;
impl ProviderType for ReadWrite {
    type Provider = PeakWriteProvider;
}

/// Generic SecurePeakData contract
#[derive(Clone)]
pub struct SecurePeakContract<T: ProviderType> {
    pub provider: Arc<T::Provider>,
    pub contract_address: Address,
    _marker: PhantomData<T>,
}

impl SecurePeakContract<ReadWrite> {
    pub async fn new(
        http_rpc_url: &str,
        private_key: &str,
        contract_address: &str,
    ) -> Result<SecurePeakContract<ReadWrite>> {
        SecurePeakContractFactory::create_write(http_rpc_url, contract_address, private_key).await
    }

    pub fn get_provider(&self) -> Arc<PeakWriteProvider> {
        self.provider.clone()
    }

    pub fn address(&self) -> &Address {
        &self.contract_address
    }
}

impl SecurePeakContract<ReadOnly> {
    pub async fn read_only(
        http_rpc_url: &str,
        contract_address: &str,
    ) -> Result<SecurePeakContract<ReadOnly>> {
        SecurePeakContractFactory::create_read(http_rpc_url, contract_address).await
    }

    pub fn get_provider(&self) -> Arc<PeakReadOnlyProvider> {
        self.provider.clone()
    }

    pub fn address(&self) -> &Address {
        &self.contract_address
    }
}

/// Type alias for read-only provider
pub type PeakReadOnlyProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
>;

/// Type alias for read-write provider
pub type PeakWriteProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider,
>;

/// Type aliases for the two contract variants
pub type SecurePeakReadContract = SecurePeakContract<ReadOnly>;
pub type SecurePeakWriteContract = SecurePeakContract<ReadWrite>;

// Factory for creating contract instances
pub struct SecurePeakContractFactory;

impl SecurePeakContractFactory {
    /// Create a write-capable contract
    pub async fn create_write(
        http_rpc_url: &str,
        contract_address: &str,
        private_key: &str,
    ) -> Result<SecurePeakContract<ReadWrite>> {
        let contract_address = contract_address.parse()?;

        let signer: PrivateKeySigner = private_key.parse()?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect(http_rpc_url)
            .await?;

        Ok(SecurePeakContract::<ReadWrite> {
            provider: Arc::new(provider),
            contract_address,
            _marker: PhantomData,
        })
    }

    /// Create a read-only contract
    pub async fn create_read(
        http_rpc_url: &str,
        contract_address: &str,
    ) -> Result<SecurePeakContract<ReadOnly>> {
        let contract_address = contract_address.parse()?;

        let provider = ProviderBuilder::new().connect(http_rpc_url).await?;

        Ok(SecurePeakContract::<ReadOnly> {
            provider: Arc::new(provider),
            contract_address,
            _marker: PhantomData,
        })
    }
}

// Implement SecurePeakRead for any SecurePeakContract regardless of provider type
#[async_trait]
impl<T: Send + Sync> SecurePeakRead for SecurePeakContract<T>
where
    T: ProviderType,
{
    async fn get_record_count(&self) -> Result<U256> {
        let contract = SecurePeakData::new(self.contract_address, &self.provider);
        let count = contract.getRecordCount().call().await?;
        Ok(count)
    }

    async fn get_record_metadata(&self, record_id: U256) -> Result<RecordMetadata> {
        let contract = SecurePeakData::new(self.contract_address, &self.provider);
        let metadata = contract.getRecordMetadata(record_id).call().await?;
        Ok(RecordMetadata {
            timestamp: metadata.timestamp,
            submitter: metadata.submitter,
            exists: metadata.exists,
        })
    }

    async fn get_record_consumption(&self, record_id: U256) -> Result<B256> {
        let contract = SecurePeakData::new(self.contract_address, &self.provider);
        let handle = contract.getRecordConsumption(record_id).call().await?;
        Ok(handle)
    }

    async fn get_record_is_peak(&self, record_id: U256) -> Result<B256> {
        let contract = SecurePeakData::new(self.contract_address, &self.provider);
        let handle = contract.getRecordIsPeak(record_id).call().await?;
        Ok(handle)
    }

    async fn get_user_record_ids(&self, user: Address) -> Result<Vec<U256>> {
        let contract = SecurePeakData::new(self.contract_address, &self.provider);
        let record_ids = contract.getUserRecordIds(user).call().await?;
        Ok(record_ids)
    }
}

// Implement SecurePeakWrite only for contracts with ReadWrite marker
#[async_trait]
impl SecurePeakWrite for SecurePeakContract<ReadWrite> {
    async fn create_record(
        &self,
        consumption_handle: B256,
        consumption_proof: Bytes,
        is_peak_handle: B256,
        is_peak_proof: Bytes,
    ) -> Result<TxOutcome> {
        let contract = SecurePeakData::new(self.contract_address, &self.provider);
        let builder = contract.createRecord(
            consumption_handle,
            consumption_proof,
            is_peak_handle,
            is_peak_proof,
        );
        let receipt = builder.send().await?.get_receipt().await?;
        Ok(TxOutcome::from(&receipt))
    }

    async fn update_consumption(
        &self,
        record_id: U256,
        consumption_handle: B256,
        consumption_proof: Bytes,
    ) -> Result<TxOutcome> {
        let contract = SecurePeakData::new(self.contract_address, &self.provider);
        let builder = contract.updateConsumption(record_id, consumption_handle, consumption_proof);
        let receipt = builder.send().await?.get_receipt().await?;
        Ok(TxOutcome::from(&receipt))
    }
}
