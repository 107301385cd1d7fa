// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use chrono::Utc;
use eyre::{bail, eyre, Result};
use peak_evm_helpers::{RecordMetadata, SecurePeakRead, SecurePeakWrite, TxOutcome};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

type ReadHook = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
struct StoredRecord {
    timestamp: u64,
    submitter: Address,
    exists: bool,
    consumption: B256,
    is_peak: B256,
}

#[derive(Default)]
struct ChainState {
    records: Vec<StoredRecord>,
    user_records: HashMap<Address, Vec<u64>>,
}

/// In-memory stand-in for the SecurePeakData contract.
///
/// Readers and writers obtained from one `MockChain` share its state;
/// writers are bound to a caller address so submitter access control can
/// be exercised. A read hook and read delay let tests interleave wallet
/// events with in-flight operations.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
    read_hook: Arc<Mutex<Option<ReadHook>>>,
    read_delay: Arc<Mutex<Option<Duration>>>,
    count_calls: Arc<AtomicU64>,
    tx_count: Arc<AtomicU64>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(&self) -> Arc<MockChainReader> {
        Arc::new(MockChainReader {
            chain: self.clone(),
        })
    }

    pub fn writer(&self, caller: Address) -> Arc<MockChainWriter> {
        Arc::new(MockChainWriter {
            chain: self.clone(),
            caller,
        })
    }

    /// Run `hook` before every contract read.
    pub fn set_read_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.read_hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn clear_read_hook(&self) {
        *self.read_hook.lock().unwrap() = None;
    }

    /// Sleep before every contract read so concurrent callers overlap.
    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    /// Number of `getRecordCount` calls served.
    pub fn count_calls(&self) -> u64 {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn record_count(&self) -> u64 {
        self.state.lock().unwrap().records.len() as u64
    }

    pub fn consumption_handle(&self, record_id: u64) -> Option<B256> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(record_id as usize)
            .map(|record| record.consumption)
    }

    async fn before_read(&self) {
        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(hook) = self.read_hook.lock().unwrap().as_ref() {
            hook();
        }
    }

    fn next_outcome(&self) -> TxOutcome {
        let nonce = self.tx_count.fetch_add(1, Ordering::SeqCst) + 1;
        TxOutcome {
            transaction_hash: keccak256(nonce.to_be_bytes()),
            status: true,
        }
    }
}

pub struct MockChainReader {
    chain: MockChain,
}

pub struct MockChainWriter {
    chain: MockChain,
    caller: Address,
}

fn record_index(record_id: U256) -> Result<usize> {
    usize::try_from(record_id).map_err(|_| eyre!("record id out of range"))
}

#[async_trait]
impl SecurePeakRead for MockChainReader {
    async fn get_record_count(&self) -> Result<U256> {
        self.chain.before_read().await;
        self.chain.count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(U256::from(self.chain.state.lock().unwrap().records.len()))
    }

    async fn get_record_metadata(&self, record_id: U256) -> Result<RecordMetadata> {
        self.chain.before_read().await;
        let state = self.chain.state.lock().unwrap();
        let record = state
            .records
            .get(record_index(record_id)?)
            .ok_or_else(|| eyre!("record {record_id} does not exist"))?;
        Ok(RecordMetadata {
            timestamp: U256::from(record.timestamp),
            submitter: record.submitter,
            exists: record.exists,
        })
    }

    async fn get_record_consumption(&self, record_id: U256) -> Result<B256> {
        self.chain.before_read().await;
        let state = self.chain.state.lock().unwrap();
        let record = state
            .records
            .get(record_index(record_id)?)
            .ok_or_else(|| eyre!("record {record_id} does not exist"))?;
        Ok(record.consumption)
    }

    async fn get_record_is_peak(&self, record_id: U256) -> Result<B256> {
        self.chain.before_read().await;
        let state = self.chain.state.lock().unwrap();
        let record = state
            .records
            .get(record_index(record_id)?)
            .ok_or_else(|| eyre!("record {record_id} does not exist"))?;
        Ok(record.is_peak)
    }

    async fn get_user_record_ids(&self, user: Address) -> Result<Vec<U256>> {
        self.chain.before_read().await;
        let state = self.chain.state.lock().unwrap();
        Ok(state
            .user_records
            .get(&user)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(U256::from)
            .collect())
    }
}

#[async_trait]
impl SecurePeakWrite for MockChainWriter {
    async fn create_record(
        &self,
        consumption_handle: B256,
        _consumption_proof: Bytes,
        is_peak_handle: B256,
        _is_peak_proof: Bytes,
    ) -> Result<TxOutcome> {
        let mut state = self.chain.state.lock().unwrap();
        let record_id = state.records.len() as u64;
        state.records.push(StoredRecord {
            timestamp: Utc::now().timestamp() as u64,
            submitter: self.caller,
            exists: true,
            consumption: consumption_handle,
            is_peak: is_peak_handle,
        });
        state
            .user_records
            .entry(self.caller)
            .or_default()
            .push(record_id);
        drop(state);
        Ok(self.chain.next_outcome())
    }

    async fn update_consumption(
        &self,
        record_id: U256,
        consumption_handle: B256,
        _consumption_proof: Bytes,
    ) -> Result<TxOutcome> {
        let mut state = self.chain.state.lock().unwrap();
        let index = record_index(record_id)?;
        let Some(record) = state.records.get_mut(index) else {
            bail!("record {record_id} does not exist");
        };
        if record.submitter != self.caller {
            bail!("execution reverted: Only submitter can update");
        }
        record.consumption = consumption_handle;
        drop(state);
        Ok(self.chain.next_outcome())
    }
}
