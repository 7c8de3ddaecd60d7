//! The [`OutputRoot`] type.

use alloy_primitives::{keccak256, B256};
use derive_more::Display;

/// An [`OutputRoot`] is the commitment to an L2 block that proposers post to the output oracle.
/// It lifts the state root from the block header as well as the storage root of the
/// `L2ToL1MessagePasser` predeploy into the top-level commitment construction.
///
/// <https://specs.optimism.io/protocol/proposals.html#l2-output-commitment-construction>
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("OutputRootV0({}, {}, {})", state_root, message_passer_storage_root, block_hash)]
pub struct OutputRoot {
    /// The state root of the block corresponding to the output root.
    pub state_root: B256,
    /// The storage root of the `L2ToL1MessagePasser` predeploy at the block corresponding to the
    /// output root.
    pub message_passer_storage_root: B256,
    /// The hash of the block the output root represents.
    pub block_hash: B256,
}

impl OutputRoot {
    /// The encoded length of a V0 output root preimage.
    pub const ENCODED_LENGTH: usize = 128;

    /// The version of the commitment. The protocol only defines version 0, encoded as 32 zero
    /// bytes at the start of the preimage.
    pub const VERSION: B256 = B256::ZERO;

    /// Constructs a V0 [`OutputRoot`] from its parts.
    pub const fn from_parts(
        state_root: B256,
        message_passer_storage_root: B256,
        block_hash: B256,
    ) -> Self {
        Self { state_root, message_passer_storage_root, block_hash }
    }

    /// Encodes the [`OutputRoot`] preimage: `version || state_root || mps_storage_root ||
    /// block_hash`.
    pub fn encode(&self) -> [u8; Self::ENCODED_LENGTH] {
        let mut encoded = [0u8; Self::ENCODED_LENGTH];
        encoded[32..64].copy_from_slice(self.state_root.as_slice());
        encoded[64..96].copy_from_slice(self.message_passer_storage_root.as_slice());
        encoded[96..128].copy_from_slice(self.block_hash.as_slice());
        encoded
    }

    /// Encodes and hashes the [`OutputRoot`].
    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }
}
