use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use async_trait::async_trait;
use op_fault_detector_primitives::{u128_to_u64, u256_to_u64, L2Output};

use crate::{
    abi::L2OutputOracle::{self, L2OutputOracleInstance},
    constants::oracle_address_by_chain_id,
    error::{ChainError, ChainResult},
};

/// The read-only output oracle capability set consumed by the detector.
#[async_trait]
pub trait OutputOracle: Send + Sync {
    /// Returns the index the next submitted output will receive. Strictly increasing over time.
    async fn next_output_index(&self) -> ChainResult<u64>;

    /// Returns the output proposal at the given index. Fails with
    /// [`ChainError::OutputNotFound`] (or a contract revert) when the index has not been
    /// proposed yet; historical entries are stable.
    async fn get_l2_output(&self, index: u64) -> ChainResult<L2Output>;

    /// Returns the challenge window in seconds. Constant over the lifetime of a deployment.
    async fn finalization_period_seconds(&self) -> ChainResult<u64>;
}

/// Read-only accessor for a deployed output oracle contract.
#[derive(Debug)]
pub struct OracleAccessor<P> {
    instance: L2OutputOracleInstance<P>,
}

impl<P: Provider> OracleAccessor<P> {
    /// Resolves the oracle deployment for the given L2 chain id and returns an accessor bound to
    /// it. An explicit non-zero override address takes precedence over the static registry.
    /// Without either, construction fails with [`ChainError::UnknownChain`].
    pub fn new(
        provider: P,
        l2_chain_id: u64,
        override_address: Option<Address>,
    ) -> ChainResult<Self> {
        let address = match override_address.filter(|addr| !addr.is_zero()) {
            Some(address) => address,
            None => oracle_address_by_chain_id(l2_chain_id)
                .ok_or(ChainError::UnknownChain(l2_chain_id))?,
        };
        Ok(Self { instance: L2OutputOracle::new(address, provider) })
    }

    /// The address of the bound oracle contract.
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

#[async_trait]
impl<P: Provider> OutputOracle for OracleAccessor<P> {
    async fn next_output_index(&self) -> ChainResult<u64> {
        let next = self.instance.nextOutputIndex().call().await?;
        Ok(u256_to_u64(next)?)
    }

    async fn get_l2_output(&self, index: u64) -> ChainResult<L2Output> {
        let proposal = self.instance.getL2Output(U256::from(index)).call().await?;
        Ok(L2Output {
            output_root: proposal.outputRoot,
            l1_timestamp: u128_to_u64(proposal.timestamp)?,
            l2_block_number: u128_to_u64(proposal.l2BlockNumber)?,
            l2_output_index: index,
        })
    }

    async fn finalization_period_seconds(&self) -> ChainResult<u64> {
        let period = self.instance.FINALIZATION_PERIOD_SECONDS().call().await?;
        Ok(u256_to_u64(period)?)
    }
}
