//! Bulk-import extraction through a chat-completion API.
//!
//! One `POST {url}` with a bearer key per import, OpenAI-style request and
//! response bodies. The returned text is handed to
//! [`cursus_core::import::parse_import_payload`]; nothing from the model is
//! trusted before that. No retry.

use async_trait::async_trait;
use cursus_core::import::{parse_import_payload, ImportBatch};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "Tu extrais des ressources pédagogiques d'un texte libre. \
Réponds uniquement avec un objet JSON de la forme \
{\"resources\": [{\"title\": string, \"url\": string, \"source\": string, \
\"isRecommended\": boolean, \"type\": \"cours\"|\"td\"|\"tp\"|\"examen\"|\"resume\"|\"video\"|\"livre\"|\"lien\"|\"autre\"}]}. \
N'invente aucun lien absent du texte.";

/// Completion endpoint settings.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl CompletionConfig {
    /// Load completion settings from environment variables.
    ///
    /// | Env Var              | Default                                       |
    /// |----------------------|-----------------------------------------------|
    /// | `COMPLETION_API_KEY` | unset (import disabled)                       |
    /// | `COMPLETION_API_URL` | `https://api.openai.com/v1/chat/completions`  |
    /// | `COMPLETION_MODEL`   | `gpt-4o-mini`                                 |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("COMPLETION_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        Some(Self {
            api_url: std::env::var("COMPLETION_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            api_key,
            model: std::env::var("COMPLETION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
        })
    }
}

/// Errors from the completion API layer.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Completion API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The response had no usable message content.
    #[error("Completion API returned no content")]
    EmptyResponse,

    /// The content was not a usable resource list.
    #[error("Invalid import payload: {0}")]
    InvalidPayload(String),
}

/// Turns free text into validated resource candidates.
#[async_trait]
pub trait ResourceExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<ImportBatch, CompletionError>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for the completion endpoint.
pub struct CompletionClient {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Send one completion request and return the message text.
    async fn complete(&self, text: &str) -> Result<String, CompletionError> {
        let body = json!({
            "model": self.config.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": text },
            ],
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatResponse = Self::ensure_success(response).await?.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }

    /// Ensure the response has a success status code, capturing the body
    /// text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CompletionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".into());
            return Err(CompletionError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ResourceExtractor for CompletionClient {
    async fn extract(&self, text: &str) -> Result<ImportBatch, CompletionError> {
        let content = self.complete(text).await.inspect_err(|e| {
            tracing::warn!(error = %e, "Completion request failed");
        })?;
        let batch = parse_import_payload(&content)
            .map_err(|e| CompletionError::InvalidPayload(e.to_string()))?;
        tracing::info!(
            accepted = batch.accepted.len(),
            rejected = batch.rejected.len(),
            "Parsed import payload"
        );
        Ok(batch)
    }
}
