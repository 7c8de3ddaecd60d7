//! A library containing the logic required to interact with the L1 and L2 chains: the JSON-RPC
//! client facade, the output oracle contract binding and the per-chain deployment registry.

mod abi;
pub use abi::L2OutputOracle;

mod client;
pub use client::{ChainApiClient, ChainClient};

mod constants;
pub use constants::{oracle_address_by_chain_id, L2_BEDROCK_MESSAGE_PASSER_ADDRESS};

mod error;
pub use error::{ChainError, ChainResult};

mod oracle;
pub use oracle::{OracleAccessor, OutputOracle};
