use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_rpc_types_eth::Block;
use async_trait::async_trait;
use op_fault_detector_primitives::{L2BlockHeader, StorageProof};

use crate::error::{ChainError, ChainResult};

/// The read-only chain capability set consumed by the detector. All methods are idempotent and
/// free to retry at the caller's discretion.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Returns the chain id of the connected node.
    async fn chain_id(&self) -> ChainResult<u64>;

    /// Returns the latest block number of the connected node.
    async fn latest_block_number(&self) -> ChainResult<u64>;

    /// Returns the block header at the given height.
    async fn header_by_number(&self, number: u64) -> ChainResult<L2BlockHeader>;

    /// Returns the latest block header of the connected node.
    async fn latest_block_header(&self) -> ChainResult<L2BlockHeader>;

    /// Returns the account proof for `address` at the given height via `eth_getProof`. No
    /// storage slots are proven; only the account storage root is consumed.
    async fn get_proof(&self, address: Address, block_number: u64) -> ChainResult<StorageProof>;
}

/// A [`ChainClient`] backed by an alloy [`Provider`].
#[derive(Debug, Clone)]
pub struct ChainApiClient<P> {
    provider: P,
}

impl<P> ChainApiClient<P> {
    /// Returns a new [`ChainApiClient`] wrapping the provided [`Provider`].
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider> ChainClient for ChainApiClient<P> {
    async fn chain_id(&self) -> ChainResult<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn latest_block_number(&self) -> ChainResult<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn header_by_number(&self, number: u64) -> ChainResult<L2BlockHeader> {
        let block = self
            .provider
            .get_block_by_number(number.into())
            .await?
            .ok_or(ChainError::BlockNotFound(number))?;
        Ok(into_header(&block))
    }

    async fn latest_block_header(&self) -> ChainResult<L2BlockHeader> {
        let number = self.provider.get_block_number().await?;
        self.header_by_number(number).await
    }

    async fn get_proof(&self, address: Address, block_number: u64) -> ChainResult<StorageProof> {
        let proof = self.provider.get_proof(address, vec![]).block_id(block_number.into()).await?;
        Ok(StorageProof { storage_hash: proof.storage_hash })
    }
}

fn into_header(block: &Block) -> L2BlockHeader {
    L2BlockHeader {
        hash: block.header.hash,
        state_root: block.header.state_root,
        number: block.header.number,
        timestamp: block.header.timestamp,
    }
}
