// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    busy::BusyFlag,
    models::{ConsumptionPoint, ConsumptionRecord, ConsumptionValue},
    session::{LiveContext, WalletSession},
    StoreError,
};
use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use eyre::{eyre, Result};
use peak_config::{ContractInfo, DeploymentRegistry};
use peak_data::StringStorage;
use peak_evm_helpers::{SecurePeakRead, SecurePeakWrite};
use peak_fhevm::{
    DecryptionSignature, EncryptedInput, FhevmInstance, HandleContractPair, WalletSigner,
};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

const ENCRYPTED_REASON: &str = "Encrypted data";
const DECRYPTED_REASON: &str = "Decrypted data";
const CANCELLED_MESSAGE: &str = "Operation cancelled - context changed";

#[derive(Default)]
struct LocalState {
    records: Vec<ConsumptionRecord>,
    graph: Vec<ConsumptionPoint>,
    message: String,
}

enum OpOutcome {
    Completed,
    Cancelled,
}

/// Context captured at the start of a mutating operation. Staleness checks
/// compare it against the live session after every suspension point.
struct OpContext {
    chain_id: Option<u64>,
    address: Address,
    user: Address,
    fhevm: Arc<dyn FhevmInstance>,
    signer: Arc<dyn WalletSigner>,
}

/// Client-side store for SecurePeakData records.
///
/// Owns the local record list, the parallel time-series view, the status
/// message, and the busy flags; presentation reads them through the
/// accessors and never mutates them directly. Each operation holds an
/// independent re-entrancy guard, so a refresh can run while a decrypt is
/// pending, but two refreshes cannot overlap.
pub struct PeakDataStore {
    session: Arc<WalletSession>,
    registry: DeploymentRegistry,
    storage: Arc<dyn StringStorage>,
    state: RwLock<LocalState>,
    refreshing: BusyFlag,
    creating: BusyFlag,
    updating: BusyFlag,
    decrypting: BusyFlag,
}

impl PeakDataStore {
    pub fn new(
        session: Arc<WalletSession>,
        registry: DeploymentRegistry,
        storage: Arc<dyn StringStorage>,
    ) -> Self {
        Self {
            session,
            registry,
            storage,
            state: RwLock::new(LocalState::default()),
            refreshing: BusyFlag::new(),
            creating: BusyFlag::new(),
            updating: BusyFlag::new(),
            decrypting: BusyFlag::new(),
        }
    }

    pub fn session(&self) -> Arc<WalletSession> {
        self.session.clone()
    }

    /// Contract metadata resolved for the currently active chain.
    pub fn contract_info(&self) -> ContractInfo {
        self.registry.resolve(self.session.chain_id())
    }

    pub fn is_deployed(&self) -> bool {
        self.contract_info().is_deployed()
    }

    pub fn records(&self) -> Vec<ConsumptionRecord> {
        self.state.read().unwrap().records.clone()
    }

    pub fn graph_data(&self) -> Vec<ConsumptionPoint> {
        self.state.read().unwrap().graph.clone()
    }

    pub fn message(&self) -> String {
        self.state.read().unwrap().message.clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.is_set()
    }

    pub fn is_creating(&self) -> bool {
        self.creating.is_set()
    }

    pub fn is_updating(&self) -> bool {
        self.updating.is_set()
    }

    pub fn is_decrypting(&self) -> bool {
        self.decrypting.is_set()
    }

    /// Rebuild the local record list from the contract.
    ///
    /// A concurrent call while one refresh is in flight is a no-op. With no
    /// resolved address, chain id, or read contract the local lists are
    /// cleared. Fetch failures surface as a status message only.
    pub async fn refresh_records(&self) {
        let Some(_busy) = self.refreshing.try_acquire() else {
            debug!("refresh already in flight");
            return;
        };

        let info = self.contract_info();
        if let (Some(chain_id), None) = (info.chain_id, info.address) {
            self.set_message(format!(
                "SecurePeakData deployment not found for chain id {chain_id}"
            ));
        }
        let (Some(address), Some(chain_id), Some(reader)) =
            (info.address, info.chain_id, self.session.reader())
        else {
            let mut state = self.state.write().unwrap();
            state.records.clear();
            state.graph.clear();
            return;
        };

        if let Err(e) = self.fetch_records(address, chain_id, &reader).await {
            self.set_message(format!("Failed to fetch records: {e}"));
        }
    }

    async fn fetch_records(
        &self,
        address: Address,
        chain_id: u64,
        reader: &Arc<dyn SecurePeakRead>,
    ) -> Result<()> {
        debug!(%address, chain_id, "refreshing records");
        let count = u64_try_from(reader.get_record_count().await?)?;

        let mut records = Vec::new();
        let mut graph = Vec::new();
        for record_id in 0..count {
            let metadata = reader.get_record_metadata(U256::from(record_id)).await?;
            // The fetch loop may span a chain switch; entries fetched for a
            // chain that is no longer active are skipped.
            if metadata.exists && self.session.same_chain(Some(chain_id)) {
                let (date, time) = format_timestamp(u64_try_from(metadata.timestamp)?);
                records.push(ConsumptionRecord {
                    id: record_id,
                    timestamp: date,
                    consumption: ConsumptionValue::Encrypted,
                    peak: false,
                    reason: ENCRYPTED_REASON.to_string(),
                    encrypted: true,
                    is_decrypted: false,
                });
                graph.push(ConsumptionPoint {
                    time,
                    consumption: 0,
                    encrypted: true,
                });
            }
        }

        if self.session.same_chain(Some(chain_id)) {
            info!(count = records.len(), "committing refreshed records");
            let mut state = self.state.write().unwrap();
            state.records = records;
            state.graph = graph;
        } else {
            warn!(chain_id, "discarding records fetched for an inactive chain");
        }
        Ok(())
    }

    /// Encrypt a consumption value and its peak flag, submit one
    /// `createRecord` transaction, and refresh on success.
    pub async fn create_record(&self, consumption: u32, is_peak: bool) -> Result<(), StoreError> {
        let Some(_busy) = self.creating.try_acquire() else {
            return Ok(());
        };
        let ctx = self.operation_context()?;
        let writer = self.session.writer().ok_or(StoreError::NotAvailable)?;
        self.set_message("Creating encrypted record...");

        match self.submit_record(&ctx, &writer, consumption, is_peak).await {
            Ok(OpOutcome::Completed) => {
                if !self.is_stale(&ctx) {
                    self.refresh_records().await;
                }
                Ok(())
            }
            Ok(OpOutcome::Cancelled) => Ok(()),
            Err(e) => {
                self.set_message(format!("Failed to create record: {e}"));
                Err(StoreError::Chain(e))
            }
        }
    }

    async fn submit_record(
        &self,
        ctx: &OpContext,
        writer: &Arc<dyn SecurePeakWrite>,
        consumption: u32,
        is_peak: bool,
    ) -> Result<OpOutcome> {
        let mut input = ctx.fhevm.create_encrypted_input(ctx.address, ctx.user);
        input.add32(consumption);
        let enc_consumption = ctx.fhevm.encrypt(&input).await?;
        if self.is_stale(ctx) {
            self.set_message(CANCELLED_MESSAGE);
            return Ok(OpOutcome::Cancelled);
        }

        // 1 = peak hour, 0 = off-peak
        let mut input = ctx.fhevm.create_encrypted_input(ctx.address, ctx.user);
        input.add32(is_peak as u32);
        let enc_is_peak = ctx.fhevm.encrypt(&input).await?;
        if self.is_stale(ctx) {
            self.set_message(CANCELLED_MESSAGE);
            return Ok(OpOutcome::Cancelled);
        }

        self.set_message("Sending transaction...");
        let outcome = writer
            .create_record(
                first_handle(&enc_consumption)?,
                enc_consumption.input_proof.clone(),
                first_handle(&enc_is_peak)?,
                enc_is_peak.input_proof.clone(),
            )
            .await?;
        info!(tx = %outcome.transaction_hash, "record creation mined");
        self.set_message(format!("Record created! status={}", outcome.status));
        Ok(OpOutcome::Completed)
    }

    /// Encrypt a replacement consumption value and submit an
    /// `updateConsumption` transaction. The contract rejects callers other
    /// than the record's submitter.
    pub async fn update_consumption(
        &self,
        record_id: u64,
        consumption: u32,
    ) -> Result<(), StoreError> {
        let Some(_busy) = self.updating.try_acquire() else {
            return Ok(());
        };
        let ctx = self.operation_context()?;
        let writer = self.session.writer().ok_or(StoreError::NotAvailable)?;
        self.set_message("Updating encrypted record...");

        match self
            .submit_consumption_update(&ctx, &writer, record_id, consumption)
            .await
        {
            Ok(OpOutcome::Completed) => {
                if !self.is_stale(&ctx) {
                    self.refresh_records().await;
                }
                Ok(())
            }
            Ok(OpOutcome::Cancelled) => Ok(()),
            Err(e) => {
                self.set_message(format!("Failed to update record: {e}"));
                Err(StoreError::Chain(e))
            }
        }
    }

    async fn submit_consumption_update(
        &self,
        ctx: &OpContext,
        writer: &Arc<dyn SecurePeakWrite>,
        record_id: u64,
        consumption: u32,
    ) -> Result<OpOutcome> {
        let mut input = ctx.fhevm.create_encrypted_input(ctx.address, ctx.user);
        input.add32(consumption);
        let enc_consumption = ctx.fhevm.encrypt(&input).await?;
        if self.is_stale(ctx) {
            self.set_message(CANCELLED_MESSAGE);
            return Ok(OpOutcome::Cancelled);
        }

        self.set_message("Sending transaction...");
        let outcome = writer
            .update_consumption(
                U256::from(record_id),
                first_handle(&enc_consumption)?,
                enc_consumption.input_proof.clone(),
            )
            .await?;
        info!(tx = %outcome.transaction_hash, record_id, "consumption update mined");
        self.set_message(format!("Record updated! status={}", outcome.status));
        Ok(OpOutcome::Completed)
    }

    /// Reveal a record's consumption and peak flag for this session.
    ///
    /// Requires a decryption signature (cached or freshly requested from
    /// the wallet). On success the local record is updated in place;
    /// `encrypted` stays true since the on-chain value remains a
    /// ciphertext.
    pub async fn decrypt_record(&self, record_id: u64) -> Result<(), StoreError> {
        let Some(_busy) = self.decrypting.try_acquire() else {
            return Ok(());
        };
        let ctx = self.operation_context()?;
        let reader = self.session.reader().ok_or(StoreError::NotAvailable)?;
        self.set_message("Decrypting record...");

        match self.reveal_record(&ctx, &reader, record_id).await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.set_message(format!("Failed to decrypt record: {e}"));
                Err(StoreError::Chain(e))
            }
        }
    }

    async fn reveal_record(
        &self,
        ctx: &OpContext,
        reader: &Arc<dyn SecurePeakRead>,
        record_id: u64,
    ) -> Result<OpOutcome> {
        let Some(sig) = DecryptionSignature::load_or_sign(
            ctx.fhevm.as_ref(),
            &[ctx.address],
            ctx.signer.as_ref(),
            self.storage.as_ref(),
        )
        .await
        else {
            self.set_message("Unable to build decryption signature");
            return Ok(OpOutcome::Cancelled);
        };
        if self.is_stale(ctx) {
            self.set_message(CANCELLED_MESSAGE);
            return Ok(OpOutcome::Cancelled);
        }

        let consumption_handle = reader.get_record_consumption(U256::from(record_id)).await?;
        let is_peak_handle = reader.get_record_is_peak(U256::from(record_id)).await?;
        if self.is_stale(ctx) {
            self.set_message(CANCELLED_MESSAGE);
            return Ok(OpOutcome::Cancelled);
        }

        self.set_message("Decrypting values...");
        let consumption = self
            .decrypt_handle(ctx, &sig, consumption_handle)
            .await?
            .ok_or_else(|| eyre!("no clear value returned for consumption handle"))?;
        let is_peak = self
            .decrypt_handle(ctx, &sig, is_peak_handle)
            .await?
            .ok_or_else(|| eyre!("no clear value returned for peak handle"))?
            != 0;
        if self.is_stale(ctx) {
            self.set_message(CANCELLED_MESSAGE);
            return Ok(OpOutcome::Cancelled);
        }

        {
            let mut state = self.state.write().unwrap();
            if let Some(record) = state
                .records
                .iter_mut()
                .find(|record| record.id == record_id)
            {
                record.consumption = ConsumptionValue::Clear(consumption);
                record.peak = is_peak;
                record.reason = DECRYPTED_REASON.to_string();
                record.is_decrypted = true;
            }
            if let Some(point) = state.graph.get_mut(record_id as usize) {
                point.consumption = consumption;
            }
        }
        info!(record_id, "record revealed");
        self.set_message("Record decrypted successfully!");
        Ok(OpOutcome::Completed)
    }

    /// One `userDecrypt` call for one handle, carrying the full signature
    /// payload. Consumption and peak flag are deliberately decrypted by two
    /// separate calls; batching would change the suspension-point count.
    async fn decrypt_handle(
        &self,
        ctx: &OpContext,
        sig: &DecryptionSignature,
        handle: B256,
    ) -> Result<Option<u64>> {
        let requests = [HandleContractPair {
            handle,
            contract_address: ctx.address,
        }];
        let values = ctx
            .fhevm
            .user_decrypt(
                &requests,
                &sig.private_key,
                &sig.public_key,
                &sig.signature,
                &sig.contract_addresses,
                sig.user_address,
                sig.start_timestamp,
                sig.duration_days,
            )
            .await?;
        Ok(values.get(&handle).copied())
    }

    /// Ids of all records submitted by `user`.
    pub async fn user_record_ids(&self, user: Address) -> Result<Vec<u64>, StoreError> {
        let reader = self.session.reader().ok_or(StoreError::NotAvailable)?;
        let record_ids = reader.get_user_record_ids(user).await?;
        Ok(record_ids
            .into_iter()
            .map(u64_try_from)
            .collect::<Result<Vec<_>>>()?)
    }

    fn operation_context(&self) -> Result<OpContext, StoreError> {
        let info = self.contract_info();
        let (Some(address), Some(fhevm), Some(signer)) =
            (info.address, self.session.fhevm(), self.session.signer())
        else {
            return Err(StoreError::NotAvailable);
        };
        let user = signer.address();
        Ok(OpContext {
            chain_id: self.session.chain_id(),
            address,
            user,
            fhevm,
            signer,
        })
    }

    fn is_stale(&self, ctx: &OpContext) -> bool {
        self.contract_info().address != Some(ctx.address)
            || !self.session.same_chain(ctx.chain_id)
            || !self.session.same_signer(Some(ctx.user))
    }

    fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "status");
        self.state.write().unwrap().message = message;
    }
}

fn first_handle(input: &EncryptedInput) -> Result<B256> {
    input
        .handles
        .first()
        .copied()
        .ok_or_else(|| eyre!("encryption produced no handle"))
}

fn u64_try_from(input: U256) -> Result<u64> {
    u64::try_from(input).map_err(|_| eyre!("value larger than 64 bits"))
}

fn format_timestamp(seconds: u64) -> (String, String) {
    let datetime = DateTime::<Utc>::from_timestamp(seconds as i64, 0).unwrap_or_default();
    (
        datetime.format("%m/%d/%Y, %H:%M").to_string(),
        datetime.format("%H:%M").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_date_and_time_views() {
        // 2024-01-15 13:45:00 UTC
        let (date, time) = format_timestamp(1_705_326_300);
        assert_eq!(date, "01/15/2024, 13:45");
        assert_eq!(time, "13:45");
    }

    #[test]
    fn u64_narrowing_rejects_oversized_values() {
        assert_eq!(u64_try_from(U256::from(42u64)).unwrap(), 42);
        assert!(u64_try_from(U256::MAX).is_err());
    }
}
