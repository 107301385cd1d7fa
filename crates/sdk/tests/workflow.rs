// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod common;

use common::{connected_harness, switch_wallet, ALICE, BOB, CHAIN_ID};
use peak_sdk::{ConsumptionValue, StoreError};
use std::time::Duration;

#[tokio::test]
async fn create_then_decrypt_round_trips_the_clear_value() {
    let harness = connected_harness();

    harness.store.create_record(920, true).await.unwrap();
    assert_eq!(harness.chain.record_count(), 1);

    let records = harness.store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 0);
    assert_eq!(records[0].consumption, ConsumptionValue::Encrypted);
    assert_eq!(records[0].reason, "Encrypted data");
    assert!(records[0].encrypted);
    assert!(!records[0].is_decrypted);
    assert!(!records[0].peak);

    let graph = harness.store.graph_data();
    assert_eq!(graph.len(), 1);
    assert_eq!(graph[0].consumption, 0);
    assert!(graph[0].encrypted);

    harness.store.decrypt_record(0).await.unwrap();

    let records = harness.store.records();
    assert_eq!(records[0].consumption, ConsumptionValue::Clear(920));
    assert!(records[0].peak);
    assert_eq!(records[0].reason, "Decrypted data");
    assert!(records[0].is_decrypted);
    // The on-chain value is still a ciphertext.
    assert!(records[0].encrypted);

    assert_eq!(harness.store.graph_data()[0].consumption, 920);
    assert_eq!(harness.store.message(), "Record decrypted successfully!");
}

#[tokio::test]
async fn create_appends_records_and_user_index() {
    let harness = connected_harness();

    harness.store.create_record(400, false).await.unwrap();
    harness.store.create_record(1200, true).await.unwrap();

    assert_eq!(harness.chain.record_count(), 2);
    assert_eq!(harness.store.records().len(), 2);
    assert_eq!(
        harness.store.user_record_ids(ALICE).await.unwrap(),
        vec![0, 1]
    );
    assert!(harness
        .store
        .user_record_ids(BOB)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn update_consumption_replaces_the_stored_value() {
    let harness = connected_harness();

    harness.store.create_record(500, false).await.unwrap();
    harness.store.update_consumption(0, 750).await.unwrap();

    harness.store.decrypt_record(0).await.unwrap();
    assert_eq!(
        harness.store.records()[0].consumption,
        ConsumptionValue::Clear(750)
    );
}

#[tokio::test]
async fn non_submitter_update_is_rejected_and_value_unchanged() {
    let harness = connected_harness();
    harness.store.create_record(600, false).await.unwrap();

    switch_wallet(&harness, BOB);
    let err = harness
        .store
        .update_consumption(0, 999)
        .await
        .expect_err("update by non-submitter must fail");
    assert!(err.to_string().contains("Only submitter can update"));
    assert!(harness
        .store
        .message()
        .contains("Only submitter can update"));

    switch_wallet(&harness, ALICE);
    harness.store.decrypt_record(0).await.unwrap();
    assert_eq!(
        harness.store.records()[0].consumption,
        ConsumptionValue::Clear(600)
    );
}

#[tokio::test]
async fn decrypt_is_idempotent() {
    let harness = connected_harness();
    harness.store.create_record(1100, false).await.unwrap();

    harness.store.decrypt_record(0).await.unwrap();
    let first = harness.store.records()[0].clone();

    harness.store.decrypt_record(0).await.unwrap();
    let second = harness.store.records()[0].clone();

    assert_eq!(first.id, second.id);
    assert_eq!(first.consumption, ConsumptionValue::Clear(1100));
    assert_eq!(second.consumption, first.consumption);
    // The cached signature served both decrypts.
    assert_eq!(harness.signer.signatures_requested(), 1);
}

#[tokio::test]
async fn decrypt_is_cancelled_when_the_chain_switches_mid_flight() {
    let harness = connected_harness();
    harness.store.create_record(920, true).await.unwrap();

    let session = harness.session.clone();
    harness
        .fhevm
        .set_suspend_hook(move || session.set_chain(Some(1)));

    harness.store.decrypt_record(0).await.unwrap();

    let records = harness.store.records();
    assert_eq!(records[0].consumption, ConsumptionValue::Encrypted);
    assert!(!records[0].is_decrypted);
    assert_eq!(
        harness.store.message(),
        "Operation cancelled - context changed"
    );
}

#[tokio::test]
async fn create_is_cancelled_when_the_signer_changes_mid_flight() {
    let harness = connected_harness();

    let session = harness.session.clone();
    harness
        .fhevm
        .set_suspend_hook(move || session.set_signer(None));

    harness.store.create_record(920, true).await.unwrap();

    assert_eq!(harness.chain.record_count(), 0);
    assert_eq!(
        harness.store.message(),
        "Operation cancelled - context changed"
    );
}

#[tokio::test]
async fn concurrent_refreshes_share_one_fetch() {
    let harness = connected_harness();
    harness.store.create_record(400, false).await.unwrap();
    harness.store.create_record(800, true).await.unwrap();

    harness.chain.set_read_delay(Duration::from_millis(10));
    let before = harness.chain.count_calls();

    tokio::join!(
        harness.store.refresh_records(),
        harness.store.refresh_records()
    );

    assert_eq!(harness.chain.count_calls(), before + 1);
    assert_eq!(harness.store.records().len(), 2);
}

#[tokio::test]
async fn refresh_discards_a_batch_fetched_for_an_inactive_chain() {
    let harness = connected_harness();
    harness.store.create_record(400, false).await.unwrap();
    harness.store.create_record(800, true).await.unwrap();
    assert_eq!(harness.store.records().len(), 2);

    let session = harness.session.clone();
    harness
        .chain
        .set_read_hook(move || session.set_chain(Some(4242)));

    harness.store.refresh_records().await;

    // The batch described a chain that is no longer active; the previous
    // view is kept.
    assert_eq!(harness.store.records().len(), 2);
    harness.chain.clear_read_hook();
}

#[tokio::test]
async fn refresh_clears_local_state_without_a_deployment() {
    let harness = connected_harness();
    harness.store.create_record(400, false).await.unwrap();
    assert_eq!(harness.store.records().len(), 1);

    harness.session.set_chain(Some(424242));
    assert!(!harness.store.is_deployed());

    harness.store.refresh_records().await;
    assert!(harness.store.records().is_empty());
    assert!(harness.store.graph_data().is_empty());
    assert!(harness
        .store
        .message()
        .contains("deployment not found for chain id 424242"));
}

#[tokio::test]
async fn operations_fail_fast_without_a_signer() {
    let harness = connected_harness();
    harness.session.set_signer(None);

    assert!(matches!(
        harness.store.create_record(1, false).await,
        Err(StoreError::NotAvailable)
    ));
    assert!(matches!(
        harness.store.decrypt_record(0).await,
        Err(StoreError::NotAvailable)
    ));
    assert!(matches!(
        harness.store.update_consumption(0, 1).await,
        Err(StoreError::NotAvailable)
    ));
}

#[tokio::test]
async fn refresh_survives_a_failing_read() {
    let harness = connected_harness();
    // No records and a reader pointed at an empty chain is fine; drop the
    // reader entirely to exercise the cleared-state path instead.
    harness.session.set_reader(None);
    harness.store.refresh_records().await;
    assert!(harness.store.records().is_empty());

    // Chain still resolves, so the store reports deployed.
    assert!(harness.store.is_deployed());
    assert_eq!(harness.store.contract_info().chain_id, Some(CHAIN_ID));
}
