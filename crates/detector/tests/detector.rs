//! Integration tests of the fault detection state machine.
#![cfg(feature = "test-utils")]

use alloy_primitives::B256;
use op_fault_detector_chain::ChainClient;
use op_fault_detector_core::{
    test_utils::{MockL2Client, MockOracle, RecordingNotifier},
    FaultDetector, TickOutcome,
};
use op_fault_detector_primitives::{L2BlockHeader, L2Output, OutputRoot, StorageProof};

const FAULT_PROOF_WINDOW: u64 = 604800;

/// Returns an oracle and an L2 client scripted with `num_outputs` consistent outputs: the root
/// posted at every index matches the one recomputable from the client's headers and proofs.
fn consistent_world(num_outputs: u64) -> (MockOracle, MockL2Client) {
    let oracle = MockOracle::new(FAULT_PROOF_WINDOW, vec![]);
    let client = MockL2Client::new(4202);

    for index in 0..num_outputs {
        let block_number = (index + 1) * 10;
        let state_root = B256::left_padding_from(&[0x10, index as u8]);
        let storage_root = B256::left_padding_from(&[0x20, index as u8]);
        let block_hash = B256::left_padding_from(&[0x30, index as u8]);

        let header = L2BlockHeader {
            hash: block_hash,
            state_root,
            number: block_number,
            timestamp: 1_700_000_000 + index,
        };
        client.insert_header(header);
        client.insert_proof(block_number, StorageProof { storage_hash: storage_root });
        client.set_latest_block_number(block_number);

        oracle.push_output(L2Output {
            output_root: OutputRoot::from_parts(state_root, storage_root, block_hash).hash(),
            l1_timestamp: 1_700_000_100 + index,
            l2_block_number: block_number,
            l2_output_index: index,
        });
    }

    (oracle, client)
}

#[tokio::test]
async fn test_matching_ticks_advance_one_index_per_tick() -> eyre::Result<()> {
    // Given
    let (oracle, client) = consistent_world(2);
    let notifier = RecordingNotifier::new();
    let mut detector = FaultDetector::new(oracle, client, notifier.clone(), 0).await?;

    // When / Then
    assert_eq!(detector.check_fault().await?, TickOutcome::Matched);
    assert_eq!(detector.current_output_index(), 1);

    assert_eq!(detector.check_fault().await?, TickOutcome::Matched);
    assert_eq!(detector.current_output_index(), 2);

    assert!(!detector.status().is_fault_detected());
    assert_eq!(notifier.count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_caught_up_detector_idles_without_advancing() -> eyre::Result<()> {
    // Given
    let (oracle, client) = consistent_world(1);
    let mut detector = FaultDetector::new(oracle, client, RecordingNotifier::new(), 1).await?;

    // When
    let outcome = detector.check_fault().await?;

    // Then
    assert_eq!(outcome, TickOutcome::CaughtUp);
    assert_eq!(detector.current_output_index(), 1);

    Ok(())
}

#[tokio::test]
async fn test_mismatch_latches_divergence_and_notifies_each_tick() -> eyre::Result<()> {
    // Given
    let (oracle, client) = consistent_world(2);
    let mut faulty = oracle.get_output(0);
    faulty.output_root = B256::repeat_byte(0xfa);
    oracle.set_output(0, faulty);

    let notifier = RecordingNotifier::new();
    let mut detector = FaultDetector::new(oracle, client, notifier.clone(), 0).await?;
    let status = detector.status();

    // When / Then: the detector stalls at the mismatching index and alerts once per tick.
    assert_eq!(detector.check_fault().await?, TickOutcome::Diverged);
    assert_eq!(detector.current_output_index(), 0);
    assert!(status.is_fault_detected());
    assert_eq!(notifier.count(), 1);

    assert_eq!(detector.check_fault().await?, TickOutcome::Diverged);
    assert_eq!(detector.current_output_index(), 0);
    assert_eq!(notifier.count(), 2);

    let message = &notifier.messages()[0];
    assert!(message.contains("output index: 0"), "unexpected alert body: {message}");
    assert!(message.contains("does not match"), "unexpected alert body: {message}");

    Ok(())
}

#[tokio::test]
async fn test_match_after_divergence_clears_flag_and_advances() -> eyre::Result<()> {
    // Given
    let (oracle, client) = consistent_world(2);
    let correct = oracle.get_output(0);
    let mut faulty = correct;
    faulty.output_root = B256::repeat_byte(0xfa);
    oracle.set_output(0, faulty);

    let notifier = RecordingNotifier::new();
    let mut detector = FaultDetector::new(oracle.clone(), client, notifier.clone(), 0).await?;
    let status = detector.status();

    assert_eq!(detector.check_fault().await?, TickOutcome::Diverged);
    assert!(status.is_fault_detected());

    // When: the posted output is consistent again, e.g. the detector's view caught up with a
    // reorg.
    oracle.set_output(0, correct);

    // Then
    assert_eq!(detector.check_fault().await?, TickOutcome::Matched);
    assert!(!status.is_fault_detected());
    assert_eq!(detector.current_output_index(), 1);
    assert_eq!(notifier.count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_transport_failure_stalls_the_index() -> eyre::Result<()> {
    // Given
    let (oracle, client) = consistent_world(1);
    let mut detector =
        FaultDetector::new(oracle.clone(), client, RecordingNotifier::new(), 0).await?;

    // When
    oracle.fail_next_call();
    let result = detector.check_fault().await;

    // Then: the tick fails without advancing and the next tick recovers.
    let err = result.unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(detector.current_output_index(), 0);

    assert_eq!(detector.check_fault().await?, TickOutcome::Matched);
    assert_eq!(detector.current_output_index(), 1);

    Ok(())
}

#[tokio::test]
async fn test_syncing_l2_node_is_an_idle_tick() -> eyre::Result<()> {
    // Given
    let (oracle, client) = consistent_world(1);
    let notifier = RecordingNotifier::new();
    let mut detector =
        FaultDetector::new(oracle, client.clone(), notifier.clone(), 0).await?;

    // When: the L2 head is behind the block the output commits to.
    client.set_latest_block_number(5);
    let outcome = detector.check_fault().await?;

    // Then
    assert_eq!(outcome, TickOutcome::L2Syncing);
    assert_eq!(detector.current_output_index(), 0);
    assert!(!detector.status().is_fault_detected());
    assert_eq!(notifier.count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_start_index_override_is_used_verbatim() -> eyre::Result<()> {
    // Given
    let (oracle, client) = consistent_world(2);

    // When
    let detector = FaultDetector::new(oracle, client, RecordingNotifier::new(), 5).await?;

    // Then: operator overrides are not validated against the oracle head.
    assert_eq!(detector.current_output_index(), 5);
    assert_eq!(detector.fault_proof_window(), FAULT_PROOF_WINDOW);

    Ok(())
}

#[tokio::test]
async fn test_auto_start_index_picks_first_unfinalized_output() -> eyre::Result<()> {
    // Given: output 0 is already past the challenge window, output 1 is not.
    let (oracle, client) = consistent_world(2);
    let latest = client.latest_block_header().await?;

    let mut finalized = oracle.get_output(0);
    finalized.l1_timestamp = latest.timestamp - FAULT_PROOF_WINDOW - 1;
    oracle.set_output(0, finalized);

    let mut pending = oracle.get_output(1);
    pending.l1_timestamp = latest.timestamp - FAULT_PROOF_WINDOW + 1;
    oracle.set_output(1, pending);

    // When
    let detector = FaultDetector::new(oracle, client, RecordingNotifier::new(), -1).await?;

    // Then
    assert_eq!(detector.current_output_index(), 1);

    Ok(())
}

#[tokio::test]
async fn test_auto_start_index_skips_to_head_when_all_outputs_finalized() -> eyre::Result<()> {
    // Given: every output is already past the challenge window.
    let (oracle, client) = consistent_world(3);
    let latest = client.latest_block_header().await?;
    for index in 0..3 {
        let mut output = oracle.get_output(index);
        output.l1_timestamp = latest.timestamp - FAULT_PROOF_WINDOW - 10;
        oracle.set_output(index, output);
    }

    // When
    let detector = FaultDetector::new(oracle, client, RecordingNotifier::new(), -1).await?;

    // Then: the detector starts at the most recently proposed index.
    assert_eq!(detector.current_output_index(), 2);

    Ok(())
}
