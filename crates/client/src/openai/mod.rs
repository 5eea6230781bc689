//! OpenAI-compatible chat-completions client.
//!
//! Sends exactly one system and one user message per call and implements
//! [`LanguageModel`] for the discovery pipeline. Any endpoint speaking the
//! `/chat/completions` protocol works.

pub mod error;
pub mod types;

pub use error::OpenAiError;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use tastemaker_core::provider::{CompletionRequest, LanguageModel};
use tastemaker_core::{AppConfig, Error};

use types::{ApiErrorBody, ChatRequest, ChatResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: "tastemaker/0.1".to_string(),
        }
    }
}

impl OpenAiConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, OpenAiError> {
        let api_key = config.require_openai_api_key().map_err(|_| OpenAiError::MissingApiKey)?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, OpenAiError> {
        if config.api_key.is_empty() {
            return Err(OpenAiError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OpenAiError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, OpenAiError> {
        Self::new(OpenAiConfig::from_app_config(config)?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Run one completion and return the first choice's text.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String, OpenAiError> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(header::USER_AGENT, &self.config.user_agent)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(OpenAiError::AuthError);
        }
        if status == 429 {
            return Err(OpenAiError::RateLimited);
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(OpenAiError::HttpError { status: status.as_u16(), message });
        }

        let bytes = response.bytes().await?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes).map_err(|e| OpenAiError::Parse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                model = %request.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "completion done"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(OpenAiError::EmptyResponse)
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, Error> {
        let chat = ChatRequest::from_completion(&self.config.model, request);
        Ok(self.chat(&chat).await?)
    }
}
