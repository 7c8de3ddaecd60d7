use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::NotificationError;

const CHAT_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// A thin client for the Slack Web API `chat.postMessage` method.
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: Client,
    token: String,
    channel_id: String,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

impl SlackClient {
    /// Returns a new [`SlackClient`] posting to the given channel.
    pub fn new(token: String, channel_id: String) -> Self {
        Self { client: Client::new(), token, channel_id }
    }

    /// Returns a new [`SlackClient`] with the access token read from the
    /// `SLACK_ACCESS_TOKEN_KEY` environment variable.
    pub fn from_env(channel_id: String) -> Result<Self, NotificationError> {
        let token = std::env::var("SLACK_ACCESS_TOKEN_KEY")
            .map_err(|_| NotificationError::MissingToken)?;
        Ok(Self::new(token, channel_id))
    }

    /// The channel messages are posted to.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Posts a plain-text message to the configured channel.
    pub async fn post_message(&self, text: &str) -> Result<(), NotificationError> {
        let response: PostMessageResponse = self
            .client
            .post(CHAT_POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&PostMessageRequest { channel: &self.channel_id, text })
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(NotificationError::Api(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::info!(
            target: "faultdetector::notification",
            channel = %self.channel_id,
            ts = response.ts.as_deref().unwrap_or_default(),
            "message sent to slack channel"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_message_request_shape() {
        let request = PostMessageRequest { channel: "C123", text: "state root mismatch" };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "channel": "C123", "text": "state root mismatch" })
        );
    }

    #[test]
    fn test_post_message_response_error_shape() {
        let response: PostMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error":"channel_not_found"}"#).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("channel_not_found"));
        assert!(response.ts.is_none());
    }
}
