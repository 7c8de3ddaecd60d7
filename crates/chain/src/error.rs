use alloy_json_rpc::RpcError;
use alloy_transport::TransportErrorKind;
use op_fault_detector_primitives::ConversionError;

/// A [`Result`] that uses [`ChainError`] as the error type.
pub type ChainResult<T> = Result<T, ChainError>;

/// An error that occurred while interacting with a chain or the output oracle.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The underlying JSON-RPC transport failed.
    #[error("rpc transport error: {0}")]
    Transport(#[from] RpcError<TransportErrorKind>),
    /// An oracle contract call failed.
    #[error("oracle contract error: {0}")]
    Contract(#[from] alloy_contract::Error),
    /// The requested block is not available on the node.
    #[error("block {0} not found")]
    BlockNotFound(u64),
    /// The requested output index has not been proposed yet.
    #[error("no output at index {0}")]
    OutputNotFound(u64),
    /// A contract return value did not fit the expected width.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// No oracle deployment is known for the chain and no override address was provided.
    #[error("no known output oracle deployment for chain id {0}, an override address is required")]
    UnknownChain(u64),
}

impl ChainError {
    /// Returns true when the error indicates data that is not (yet) available rather than a
    /// failed transport.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::BlockNotFound(_) | Self::OutputNotFound(_))
    }
}
