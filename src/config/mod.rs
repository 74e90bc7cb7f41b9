use std::time::Duration;

use crate::cli::Args;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_ENDPOINT: &str = "https://ai-proxy.lab.epam.com";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Settings for a completion client, built once at startup.
///
/// Values are not validated here; `DialChatClient::new` rejects an empty key
/// or an unparseable endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub deployment: String,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = deployment.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn from_args(args: &Args) -> Self {
        Self {
            api_key: args.api_key.clone(),
            base_url: args.endpoint.clone(),
            deployment: args.deployment.clone(),
            connect_timeout: Duration::from_secs(args.connect_timeout),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_ENDPOINT.to_string(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Options for the interactive session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub stream: bool,
    pub system_prompt: Option<String>,
}

impl SessionOptions {
    pub fn from_args(args: &Args) -> Self {
        Self {
            stream: !args.no_stream,
            system_prompt: args.system_prompt.clone(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            stream: true,
            system_prompt: None,
        }
    }
}
