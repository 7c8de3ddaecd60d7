//! Config file loading and validation.
//!
//! The config is a TOML file whose sections map one-to-one onto the structs below. Parsing and
//! validation are separate steps so every validation failure can be reported at once.

use std::{
    net::{IpAddr, SocketAddr},
    path::Path,
};

use alloy_primitives::Address;
use serde::Deserialize;
use url::Url;

/// The contents of the parsed config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Config {
    /// Process-wide settings.
    pub(crate) system: SystemConfig,
    /// HTTP server settings.
    pub(crate) api: ApiConfig,
    /// Detection loop settings.
    pub(crate) fault_detector: FaultDetectorConfig,
    /// Alerting settings.
    #[serde(default)]
    pub(crate) notification: NotificationConfig,
}

/// The `system` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct SystemConfig {
    /// Logger verbosity.
    pub(crate) log_level: LogLevel,
}

/// Logger verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogLevel {
    /// Most verbose.
    Trace,
    /// Debugging output.
    Debug,
    /// Standard operational output.
    Info,
    /// Recoverable anomalies only.
    Warn,
    /// Failures only.
    Error,
    /// Unrecoverable failures only.
    Fatal,
}

impl LogLevel {
    /// The tracing filter directive for the level. `fatal` has no tracing counterpart and maps
    /// to `error`.
    pub(crate) const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error | Self::Fatal => "error",
        }
    }
}

/// The `api` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ApiConfig {
    /// Bind address of the HTTP server.
    pub(crate) server: ServerConfig,
    /// Mount prefix for the versioned routes, `api` or `/api`.
    pub(crate) base_path: String,
    /// The API versions to register, e.g. `["v1"]`.
    pub(crate) register_versions: Vec<String>,
}

/// The `api.server` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ServerConfig {
    /// IPv4 host to bind.
    pub(crate) host: String,
    /// Port to bind.
    pub(crate) port: u16,
}

impl ServerConfig {
    /// The socket address to bind. Only valid after [`Config::validate`] passed.
    pub(crate) fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        Ok(SocketAddr::new(self.host.parse::<IpAddr>()?, self.port))
    }
}

/// The `fault_detector` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct FaultDetectorConfig {
    /// L1 JSON-RPC endpoint.
    pub(crate) l1_rpc_endpoint: String,
    /// L2 JSON-RPC endpoint.
    pub(crate) l2_rpc_endpoint: String,
    /// The output index to start checking from. `-1` discovers the first unfinalized output.
    #[serde(default = "default_start_batch_index")]
    pub(crate) start_batch_index: i64,
    /// Output oracle address override for chains without a registry entry.
    #[serde(default)]
    pub(crate) l2_output_oracle_contract_address: Option<Address>,
}

const fn default_start_batch_index() -> i64 {
    -1
}

/// The `notification` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub(crate) struct NotificationConfig {
    /// Whether to build a notifier.
    #[serde(default)]
    pub(crate) enable: bool,
    /// Slack channel settings, required when notifications are enabled.
    #[serde(default)]
    pub(crate) slack: Option<SlackConfig>,
}

/// The `notification.slack` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct SlackConfig {
    /// The channel alerts are posted to.
    pub(crate) channel_id: String,
}

/// The aggregated validation failures of a parsed config.
#[derive(Debug, thiserror::Error)]
#[error(
    "fix the following {} config validation fail(s) to continue:\n\t- {}",
    .0.len(),
    .0.join("\n\t- ")
)]
pub(crate) struct ValidationErrors(pub Vec<String>);

const ALLOWED_ENDPOINT_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

impl Config {
    /// Runs all validations and returns every failure at once.
    pub(crate) fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        self.api.validate(&mut errors);
        self.fault_detector.validate(&mut errors);
        self.notification.validate(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl ApiConfig {
    fn validate(&self, errors: &mut Vec<String>) {
        if self.server.host.parse::<std::net::Ipv4Addr>().is_err() {
            errors.push(format!(
                "api.server.host expected an IPv4 address, received: '{}'",
                self.server.host
            ));
        }

        if !matches!(self.base_path.as_str(), "api" | "/api") {
            errors.push(format!(
                "api.base_path expected to match `^/?api$`, received: '{}'",
                self.base_path
            ));
        }

        for version in &self.register_versions {
            if !is_valid_version(version) {
                errors.push(format!(
                    "api.register_versions entry expected to match `^v[1-9]\\d*$`, received: '{version}'"
                ));
            }
        }
    }
}

impl FaultDetectorConfig {
    fn validate(&self, errors: &mut Vec<String>) {
        for (key, endpoint) in [
            ("fault_detector.l1_rpc_endpoint", &self.l1_rpc_endpoint),
            ("fault_detector.l2_rpc_endpoint", &self.l2_rpc_endpoint),
        ] {
            match Url::parse(endpoint) {
                Ok(url) if ALLOWED_ENDPOINT_SCHEMES.contains(&url.scheme()) => {}
                Ok(url) => errors.push(format!(
                    "{key} expected scheme one of {ALLOWED_ENDPOINT_SCHEMES:?}, received: '{}'",
                    url.scheme()
                )),
                Err(err) => errors.push(format!("{key} is not a valid url: {err}")),
            }
        }
    }
}

impl NotificationConfig {
    fn validate(&self, errors: &mut Vec<String>) {
        if !self.enable {
            return;
        }
        match &self.slack {
            Some(slack) if !slack.channel_id.is_empty() => {}
            _ => errors.push(
                "notification.slack.channel_id is required when notification.enable is true"
                    .to_string(),
            ),
        }
    }
}

fn is_valid_version(version: &str) -> bool {
    let Some(digits) = version.strip_prefix('v') else { return false };
    let mut chars = digits.chars();
    matches!(chars.next(), Some('1'..='9')) && chars.all(|c| c.is_ascii_digit())
}

/// Reads and parses the config file at the given path.
pub(crate) fn from_toml_path(path: impl AsRef<Path>) -> eyre::Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&contents)?)
}
