//! The fault detection service for OP Stack output roots.
//!
//! The detector walks the output oracle one index at a time. For every proposed output it
//! recomputes the expected output root from the L2 block header and the message-passer storage
//! proof, compares it against the value the proposer posted on L1, and latches a divergence flag
//! plus metrics and a notification when the two disagree.

mod finder;
pub use finder::find_first_unfinalized_output_index;

mod metrics;
pub use metrics::FaultDetectorMetrics;

mod status;
pub use status::FaultStatus;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers
pub mod test_utils;

use std::time::{Duration, Instant};

use op_fault_detector_chain::{
    ChainClient, ChainResult, OutputOracle, L2_BEDROCK_MESSAGE_PASSER_ADDRESS,
};
use op_fault_detector_notification::{Notifier, Notify};
use op_fault_detector_primitives::OutputRoot;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// The interval between two detection ticks.
pub const DETECTION_INTERVAL: Duration = Duration::from_secs(1);

/// The wait applied after a failed RPC call before the next tick.
pub const FAILURE_WAIT_INTERVAL: Duration = Duration::from_secs(10);

/// The outcome of a completed detection tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The computed output root matched the proposed one and the index advanced.
    Matched,
    /// The computed output root diverged from the proposed one; the index stalled.
    Diverged,
    /// The detector is caught up with the oracle head.
    CaughtUp,
    /// The L2 node has not reached the output block yet.
    L2Syncing,
}

/// The fault detector owns the RPC handles and the mutable detection state, and checks one
/// output per tick.
#[derive(Debug)]
pub struct FaultDetector<O, C, N = Notifier> {
    oracle: O,
    l2_client: C,
    notifier: N,
    metrics: FaultDetectorMetrics,
    status: FaultStatus,
    fault_proof_window: u64,
    current_output_index: u64,
}

impl<O, C, N> FaultDetector<O, C, N>
where
    O: OutputOracle,
    C: ChainClient,
    N: Notify,
{
    /// Returns a new [`FaultDetector`] with the challenge window and the starting output index
    /// resolved against the live chains.
    ///
    /// A non-negative `start_batch_index` is taken verbatim as an operator override. Otherwise
    /// the starting index is discovered via [`find_first_unfinalized_output_index`], falling
    /// back to the most recently proposed index when every output is already finalized.
    pub async fn new(
        oracle: O,
        l2_client: C,
        notifier: N,
        start_batch_index: i64,
    ) -> ChainResult<Self> {
        let fault_proof_window = oracle.finalization_period_seconds().await?;
        tracing::info!(target: "faultdetector", fault_proof_window, "fault proof window resolved");

        let current_output_index = if start_batch_index >= 0 {
            start_batch_index as u64
        } else {
            tracing::info!(target: "faultdetector", "finding appropriate starting unfinalized batch");
            match find_first_unfinalized_output_index(&oracle, &l2_client, fault_proof_window)
                .await?
            {
                Some(index) => index,
                None => {
                    tracing::info!(
                        target: "faultdetector",
                        "no unfinalized batches found, skipping all batches"
                    );
                    oracle.next_output_index().await?.saturating_sub(1)
                }
            }
        };
        tracing::info!(
            target: "faultdetector",
            index = current_output_index,
            "starting unfinalized batch index resolved"
        );

        let metrics = FaultDetectorMetrics::default();
        metrics.is_state_mismatch.set(0.0);

        Ok(Self {
            oracle,
            l2_client,
            notifier,
            metrics,
            status: FaultStatus::new(),
            fault_proof_window,
            current_output_index,
        })
    }

    /// Returns a cloneable handle on the divergence flag for the HTTP status handler.
    pub fn status(&self) -> FaultStatus {
        self.status.clone()
    }

    /// Returns true when the most recent completed comparison produced a mismatch.
    pub fn is_fault_detected(&self) -> bool {
        self.status.is_fault_detected()
    }

    /// The output index the next tick will check.
    pub const fn current_output_index(&self) -> u64 {
        self.current_output_index
    }

    /// The challenge window in seconds, captured at construction.
    pub const fn fault_proof_window(&self) -> u64 {
        self.fault_proof_window
    }

    /// Main execution loop for the [`FaultDetector`]. Runs one [`Self::check_fault`] per tick
    /// until the cancellation token fires; transport failures back off for
    /// [`FAILURE_WAIT_INTERVAL`] before the next tick.
    pub async fn run(mut self, cancellation: CancellationToken) {
        tracing::info!(
            target: "faultdetector",
            interval_secs = DETECTION_INTERVAL.as_secs(),
            "started fault detector service, checking for state root every interval"
        );
        let mut interval = tokio::time::interval(DETECTION_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    tracing::info!(target: "faultdetector", "received shutdown signal, stopping fault detector service");
                    return;
                }
                _ = interval.tick() => {
                    match self.check_fault().await {
                        Ok(outcome) => {
                            tracing::trace!(target: "faultdetector", ?outcome, "tick completed");
                        }
                        Err(err) if err.is_not_found() => {
                            tracing::warn!(target: "faultdetector", %err, "data not yet available, retrying on the next tick");
                        }
                        Err(err) => {
                            tracing::warn!(
                                target: "faultdetector",
                                %err,
                                wait_secs = FAILURE_WAIT_INTERVAL.as_secs(),
                                "rpc failure, backing off"
                            );
                            tokio::select! {
                                _ = cancellation.cancelled() => return,
                                _ = tokio::time::sleep(FAILURE_WAIT_INTERVAL) => {}
                            }
                            interval.reset();
                        }
                    }
                }
            }
        }
    }

    /// Checks the output at the current index against the root recomputed from the L2 node.
    ///
    /// On a match the index advances by one; a divergence latches the mismatch flag, notifies
    /// the configured channel and stalls at the current index until a later tick matches. A
    /// detector that is caught up with the oracle, or ahead of a syncing L2 node, idles without
    /// advancing.
    pub async fn check_fault(&mut self) -> ChainResult<TickOutcome> {
        let start = Instant::now();
        tracing::debug!(
            target: "faultdetector",
            index = self.current_output_index,
            "checking current batch"
        );

        let next_output_index =
            self.guard(self.oracle.next_output_index().await).inspect_err(|err| {
                tracing::error!(target: "faultdetector", %err, "failed to query next output index")
            })?;

        let latest_batch_index = next_output_index.saturating_sub(1);
        if self.current_output_index > latest_batch_index {
            tracing::debug!(
                target: "faultdetector",
                index = self.current_output_index,
                latest_batch_index,
                "caught up with the oracle, waiting for the next output"
            );
            return Ok(TickOutcome::CaughtUp);
        }

        let output = self
            .guard(self.oracle.get_l2_output(self.current_output_index).await)
            .inspect_err(|err| {
                tracing::error!(
                    target: "faultdetector",
                    index = self.current_output_index,
                    %err,
                    "failed to fetch output for the current index"
                )
            })?;

        let latest_block_number =
            self.guard(self.l2_client.latest_block_number().await).inspect_err(|err| {
                tracing::error!(target: "faultdetector", %err, "failed to query latest l2 block number")
            })?;

        if latest_block_number < output.l2_block_number {
            tracing::info!(
                target: "faultdetector",
                head = latest_block_number,
                output_block = output.l2_block_number,
                "l2 node is behind, waiting for node to sync with the network"
            );
            return Ok(TickOutcome::L2Syncing);
        }

        let header = self
            .guard(self.l2_client.header_by_number(output.l2_block_number).await)
            .inspect_err(|err| {
                tracing::error!(
                    target: "faultdetector",
                    number = output.l2_block_number,
                    %err,
                    "failed to fetch block header by number"
                )
            })?;

        let proof = self
            .guard(
                self.l2_client
                    .get_proof(L2_BEDROCK_MESSAGE_PASSER_ADDRESS, output.l2_block_number)
                    .await,
            )
            .inspect_err(|err| {
                tracing::error!(
                    target: "faultdetector",
                    number = output.l2_block_number,
                    address = %L2_BEDROCK_MESSAGE_PASSER_ADDRESS,
                    %err,
                    "failed to fetch message passer proof"
                )
            })?;

        let computed =
            OutputRoot::from_parts(header.state_root, proof.storage_hash, header.hash).hash();

        if computed != output.output_root {
            self.status.set_diverged(true);
            self.metrics.is_state_mismatch.set(1.0);
            let finalization_time = header.timestamp + self.fault_proof_window;

            let message = format!(
                "Fault detected, state root does not match:\noutput index: {}\nexpected output \
                 root: {}\ncomputed output root: {}\nfinalization time (unix seconds): {}",
                self.current_output_index, output.output_root, computed, finalization_time
            );
            if let Err(err) = self.notifier.notify(&message).await {
                tracing::error!(target: "faultdetector", %err, "failed to deliver divergence notification");
            }

            tracing::error!(
                target: "faultdetector",
                index = self.current_output_index,
                expected = %output.output_root,
                computed = %computed,
                finalization_time,
                "state root does not match"
            );
            return Ok(TickOutcome::Diverged);
        }

        self.metrics.highest_output_index.set(self.current_output_index as f64);
        self.status.set_diverged(false);
        self.metrics.is_state_mismatch.set(0.0);

        tracing::info!(
            target: "faultdetector",
            index = self.current_output_index,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "successfully checked current batch"
        );
        self.current_output_index += 1;
        Ok(TickOutcome::Matched)
    }

    /// Bumps the connection failure gauge when the result carries a transport error.
    fn guard<T>(&self, result: ChainResult<T>) -> ChainResult<T> {
        if let Err(err) = &result {
            if !err.is_not_found() {
                self.metrics.api_connection_failure.increment(1.0);
            }
        }
        result
    }
}
