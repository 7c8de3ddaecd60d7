use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use alloy_primitives::Address;
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use op_fault_detector_chain::{ChainClient, ChainError, ChainResult, OutputOracle};
use op_fault_detector_notification::{NotificationError, Notify};
use op_fault_detector_primitives::{L2BlockHeader, L2Output, StorageProof};

/// A scriptable [`OutputOracle`] backed by an in-memory output list. Clones share state so a
/// test can reconfigure the oracle after handing it to a detector.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    inner: Arc<Mutex<MockOracleInner>>,
}

#[derive(Debug, Default)]
struct MockOracleInner {
    finalization_period: u64,
    outputs: Vec<L2Output>,
    fail_next_call: bool,
}

impl MockOracle {
    /// Returns a new [`MockOracle`] with the given challenge window and output list.
    pub fn new(finalization_period: u64, outputs: Vec<L2Output>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockOracleInner {
                finalization_period,
                outputs,
                fail_next_call: false,
            })),
        }
    }

    /// Appends an output at the next index.
    pub fn push_output(&self, output: L2Output) {
        self.inner.lock().unwrap().outputs.push(output);
    }

    /// Replaces the output at the given index.
    pub fn set_output(&self, index: u64, output: L2Output) {
        self.inner.lock().unwrap().outputs[index as usize] = output;
    }

    /// Returns a copy of the output at the given index.
    pub fn get_output(&self, index: u64) -> L2Output {
        self.inner.lock().unwrap().outputs[index as usize]
    }

    /// Makes the next oracle call fail with a transport error.
    pub fn fail_next_call(&self) {
        self.inner.lock().unwrap().fail_next_call = true;
    }

    fn check_failure(inner: &mut MockOracleInner) -> ChainResult<()> {
        if inner.fail_next_call {
            inner.fail_next_call = false;
            return Err(TransportErrorKind::custom_str("mock transport failure").into());
        }
        Ok(())
    }
}

#[async_trait]
impl OutputOracle for MockOracle {
    async fn next_output_index(&self) -> ChainResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        Ok(inner.outputs.len() as u64)
    }

    async fn get_l2_output(&self, index: u64) -> ChainResult<L2Output> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        inner.outputs.get(index as usize).copied().ok_or(ChainError::OutputNotFound(index))
    }

    async fn finalization_period_seconds(&self) -> ChainResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        Ok(inner.finalization_period)
    }
}

/// A scriptable [`ChainClient`] backed by in-memory headers and proofs. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockL2Client {
    inner: Arc<Mutex<MockL2ClientInner>>,
}

#[derive(Debug, Default)]
struct MockL2ClientInner {
    chain_id: u64,
    latest_block_number: u64,
    headers: HashMap<u64, L2BlockHeader>,
    proofs: HashMap<u64, StorageProof>,
    fail_next_call: bool,
}

impl MockL2Client {
    /// Returns a new [`MockL2Client`] with the given chain id.
    pub fn new(chain_id: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockL2ClientInner { chain_id, ..Default::default() })),
        }
    }

    /// Sets the latest block number reported by the client.
    pub fn set_latest_block_number(&self, number: u64) {
        self.inner.lock().unwrap().latest_block_number = number;
    }

    /// Inserts a header, keyed by its block number.
    pub fn insert_header(&self, header: L2BlockHeader) {
        self.inner.lock().unwrap().headers.insert(header.number, header);
    }

    /// Inserts the message-passer proof for the given block number.
    pub fn insert_proof(&self, block_number: u64, proof: StorageProof) {
        self.inner.lock().unwrap().proofs.insert(block_number, proof);
    }

    /// Makes the next client call fail with a transport error.
    pub fn fail_next_call(&self) {
        self.inner.lock().unwrap().fail_next_call = true;
    }

    fn check_failure(inner: &mut MockL2ClientInner) -> ChainResult<()> {
        if inner.fail_next_call {
            inner.fail_next_call = false;
            return Err(TransportErrorKind::custom_str("mock transport failure").into());
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockL2Client {
    async fn chain_id(&self) -> ChainResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        Ok(inner.chain_id)
    }

    async fn latest_block_number(&self) -> ChainResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        Ok(inner.latest_block_number)
    }

    async fn header_by_number(&self, number: u64) -> ChainResult<L2BlockHeader> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        inner.headers.get(&number).copied().ok_or(ChainError::BlockNotFound(number))
    }

    async fn latest_block_header(&self) -> ChainResult<L2BlockHeader> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        let number = inner.latest_block_number;
        inner.headers.get(&number).copied().ok_or(ChainError::BlockNotFound(number))
    }

    async fn get_proof(&self, _address: Address, block_number: u64) -> ChainResult<StorageProof> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_failure(&mut inner)?;
        inner.proofs.get(&block_number).copied().ok_or(ChainError::BlockNotFound(block_number))
    }
}

/// A [`Notify`] implementation that records delivered messages.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    /// Returns a new, empty [`RecordingNotifier`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the messages delivered so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Returns the number of messages delivered so far.
    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}
