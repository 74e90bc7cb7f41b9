use async_trait::async_trait;
use futures::StreamExt;
use log::{ debug, info, warn };
use reqwest::{
    Client as HttpClient,
    StatusCode,
    header::{ HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE },
};
use serde::{ Deserialize, Serialize };
use url::Url;

use super::sse::StreamDecoder;
use super::{ ChatClient, ContentObserver, PendingCompletion };
use crate::config::ClientConfig;
use crate::llm::LlmError;
use crate::models::chat::Message;

const API_KEY_HEADER: &str = "api-key";

/// Chat-completion client for an Azure-style DIAL deployment endpoint.
pub struct DialChatClient {
    http: HttpClient,
    deployment: String,
    endpoint: String,
    observer: Option<ContentObserver>,
}

#[derive(Serialize)]
struct DialChatRequest<'a> {
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Deserialize)]
struct DialChatResponse {
    choices: Option<Vec<DialChoice>>,
}

#[derive(Deserialize)]
struct DialChoice {
    message: Option<DialResponseMessage>,
}

#[derive(Deserialize)]
struct DialResponseMessage {
    content: Option<String>,
}

impl DialChatClient {
    pub fn new(config: ClientConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key cannot be null or empty".to_string()));
        }
        if config.deployment.trim().is_empty() {
            return Err(LlmError::Configuration("Deployment name cannot be empty".to_string()));
        }
        let endpoint = build_endpoint(&config.base_url, &config.deployment)?;

        let mut api_key = HeaderValue::from_str(&config.api_key).map_err(|e|
            LlmError::Configuration(format!("Invalid API key format: {}", e))
        )?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let http = HttpClient::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            "DIAL chat client configured: Deployment={}, Endpoint={}",
            config.deployment,
            endpoint
        );

        Ok(Self {
            http,
            deployment: config.deployment,
            endpoint,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: ContentObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }
}

#[async_trait]
impl ChatClient for DialChatClient {
    async fn get_completion(&self, messages: &[Message]) -> Result<Message, LlmError> {
        let req = DialChatRequest { messages, stream: None };
        debug!("Requesting completion for {} messages", messages.len());

        let resp = send_request(&self.http, &self.endpoint, &req).await?;
        let body = resp.text().await?;
        let content = parse_completion_body(&body)?;

        if let Some(observer) = &self.observer {
            observer(&content);
        }
        Ok(Message::assistant(content))
    }

    fn stream_completion(&self, messages: Vec<Message>) -> PendingCompletion {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let observer = self.observer.clone();

        PendingCompletion::spawn(async move {
            stream_chat(http, endpoint, messages, observer).await
        })
    }
}

/// Joins the base URL and deployment into the chat-completions route.
pub fn build_endpoint(base_url: &str, deployment: &str) -> Result<String, LlmError> {
    let base = base_url.trim();
    let url = Url::parse(base).map_err(|e|
        LlmError::Configuration(format!("Invalid endpoint '{}': {}", base, e))
    )?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(
            LlmError::Configuration(
                format!("Endpoint '{}' must use http or https, got '{}'", base, url.scheme())
            )
        );
    }
    Ok(
        format!(
            "{}/openai/deployments/{}/chat/completions",
            base.trim_end_matches('/'),
            deployment
        )
    )
}

async fn send_request(
    http: &HttpClient,
    endpoint: &str,
    req: &DialChatRequest<'_>
) -> Result<reqwest::Response, LlmError> {
    let resp = http.post(endpoint).json(req).send().await?;

    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        warn!("Completion request failed with HTTP {}", status);
        return Err(LlmError::Request { status: status.as_u16(), body });
    }
    Ok(resp)
}

fn parse_completion_body(body: &str) -> Result<String, LlmError> {
    let resp: DialChatResponse = serde_json::from_str(body)?;
    let choice = resp.choices
        .and_then(|choices| choices.into_iter().next())
        .ok_or_else(|| LlmError::Protocol("No choices in response".to_string()))?;

    choice.message
        .and_then(|message| message.content)
        .ok_or_else(|| LlmError::Protocol("First choice has no message content".to_string()))
}

async fn stream_chat(
    http: HttpClient,
    endpoint: String,
    messages: Vec<Message>,
    observer: Option<ContentObserver>
) -> Result<Message, LlmError> {
    let req = DialChatRequest {
        messages: &messages,
        stream: Some(true),
    };
    debug!("Requesting streamed completion for {} messages", messages.len());

    let resp = send_request(&http, &endpoint, &req).await?;
    let mut stream = resp.bytes_stream();
    let mut decoder = StreamDecoder::new();
    let mut content = String::new();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        for delta in decoder.push(&chunk)? {
            emit(&observer, &delta);
            content.push_str(&delta);
        }
    }
    for delta in decoder.finish()? {
        emit(&observer, &delta);
        content.push_str(&delta);
    }

    debug!("Streamed completion finished ({} bytes)", content.len());
    Ok(Message::assistant(content))
}

fn emit(observer: &Option<ContentObserver>, delta: &str) {
    if let Some(observer) = observer {
        observer(delta);
    }
}
