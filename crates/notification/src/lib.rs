//! Best-effort alert channels for the fault detector.
//!
//! Delivery is advisory: callers log and swallow notification errors, a failed alert must never
//! stop the detection loop.

use async_trait::async_trait;

mod slack;
pub use slack::SlackClient;

/// An error that occurred while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The HTTP request failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The Slack Web API rejected the message.
    #[error("slack api error: {0}")]
    Api(String),
    /// The Slack access token environment variable is not set.
    #[error("SLACK_ACCESS_TOKEN_KEY environment variable is required when slack notifications are enabled")]
    MissingToken,
}

/// An instance of the trait can push a human-readable alert to an external channel.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Delivers the message to the channel.
    async fn notify(&self, message: &str) -> Result<(), NotificationError>;
}

/// The configured notification channel.
#[derive(Debug, Clone, Default)]
pub enum Notifier {
    /// Alerts are posted to a Slack channel.
    Slack(SlackClient),
    /// Notifications are turned off.
    #[default]
    Disabled,
}

#[async_trait]
impl Notify for Notifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        match self {
            Self::Slack(client) => client.post_message(message).await,
            Self::Disabled => Ok(()),
        }
    }
}
