//! Common test helpers: scriptable in-memory implementations of the oracle, the L2 client and
//! the notification channel.

mod mock;
pub use mock::{MockL2Client, MockOracle, RecordingNotifier};
