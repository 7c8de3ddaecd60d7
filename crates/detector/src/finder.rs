use op_fault_detector_chain::{ChainClient, ChainResult, OutputOracle};

/// Finds the first output index that has not yet passed the challenge window: the smallest index
/// whose `l1_timestamp + fault_proof_window` is at or past the latest L2 block timestamp.
///
/// Returns `None` when every submitted output is already finalized, which happens when no output
/// has been posted for an entire challenge period. Any RPC failure surfaces to the caller;
/// re-running against an unchanged oracle yields the same result.
pub async fn find_first_unfinalized_output_index<O, C>(
    oracle: &O,
    l2_client: &C,
    fault_proof_window: u64,
) -> ChainResult<Option<u64>>
where
    O: OutputOracle + ?Sized,
    C: ChainClient + ?Sized,
{
    let latest_header = l2_client.latest_block_header().await?;
    let total_outputs = oracle.next_output_index().await?;

    // Binary search for the first output that will still pass through the challenge period.
    let mut lo = 0u64;
    let mut hi = total_outputs;
    while lo != hi {
        let mid = lo + (hi - lo) / 2;
        let output = oracle.get_l2_output(mid).await?;
        if output.l1_timestamp + fault_proof_window < latest_header.timestamp {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    if lo == total_outputs {
        tracing::warn!(
            target: "faultdetector",
            total_outputs,
            "no output submitted within the entire challenge period, first unfinalized output \
             index is undefined"
        );
        return Ok(None);
    }

    Ok(Some(lo))
}
