//! Anthropic Messages API client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chronicle_changelog::{GenerationReply, TextGenerator};
use chronicle_core::config::GenerationConfig;
use chronicle_core::error::GenerationError;

/// API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Text generator backed by the Anthropic Messages API
pub struct AnthropicClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
}

impl AnthropicClient {
    /// Create a client from generation settings and a resolved key
    pub fn new(config: &GenerationConfig, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationReply, GenerationError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("no API key configured");
            return Err(GenerationError::Authentication(
                "no API key configured".to_string(),
            ));
        };

        let url = self.messages_url();
        info!(model = %self.model, "requesting changelog draft");
        debug!("Anthropic API request: POST {}", url);

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Failed(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Failed(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &text));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::UnexpectedResponseShape(e.to_string()))?;
        reply_from(parsed)
    }
}

/// Map an unsuccessful response onto a generation error
fn classify_failure(status: u16, body: &str) -> GenerationError {
    let detail = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);

    if status == 401 || detail.as_ref().is_some_and(|d| d.kind == "authentication_error") {
        let message = detail
            .map(|d| d.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));
        return GenerationError::Authentication(message);
    }

    let message = match detail {
        Some(d) => format!("HTTP {status}: {}: {}", d.kind, d.message),
        None => format!("HTTP {status}: {body}"),
    };
    GenerationError::Failed(message)
}

/// Take the first content block of a reply
fn reply_from(response: MessagesResponse) -> Result<GenerationReply, GenerationError> {
    let block = response.content.into_iter().next().ok_or_else(|| {
        GenerationError::UnexpectedResponseShape("reply has no content".to_string())
    })?;

    match (block.kind.as_str(), block.text) {
        ("text", Some(text)) => Ok(GenerationReply::Text(text)),
        (_, _) => Ok(GenerationReply::NonText { kind: block.kind }),
    }
}
