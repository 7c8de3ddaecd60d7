//! Chain-facing data types consumed by the detector.

use alloy_primitives::B256;

/// An output proposal read from the output oracle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L2Output {
    /// The output root the proposer posted for the batch.
    pub output_root: B256,
    /// The L1 timestamp at which the output was proposed, in unix seconds.
    pub l1_timestamp: u64,
    /// The L2 block number the output commits to.
    pub l2_block_number: u64,
    /// The index of the output in the oracle.
    pub l2_output_index: u64,
}

/// The subset of an L2 block header needed to recompute an output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L2BlockHeader {
    /// The block hash.
    pub hash: B256,
    /// The state root of the block.
    pub state_root: B256,
    /// The block number.
    pub number: u64,
    /// The block timestamp, in unix seconds.
    pub timestamp: u64,
}

/// The account proof response fields consumed by the detector. Only the storage trie root of the
/// proven account participates in the output root construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageProof {
    /// The storage trie root of the proven account.
    pub storage_hash: B256,
}
