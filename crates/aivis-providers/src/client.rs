//! HTTP client for a single provider's completion endpoint.
//!
//! One [`ProviderClient`] talks to exactly one provider. Use
//! [`ProviderClient::new`] for production or [`ProviderClient::with_base_url`]
//! to point at a mock server in tests.

use std::time::Duration;

use aivis_core::ProviderKind;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::types::{
    AnthropicMessagesRequest, AnthropicMessagesResponse, ChatMessage, GeminiGenerateRequest,
    GeminiGenerateResponse, GeminiRequestContent, GeminiRequestPart, OpenAiChatRequest,
    OpenAiChatResponse,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 1024;
const OPENAI_TEMPERATURE: f32 = 0.2;

/// Production API root for `provider`.
#[must_use]
pub fn default_base_url(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::OpenAi => "https://api.openai.com/",
        ProviderKind::Anthropic => "https://api.anthropic.com/",
        ProviderKind::Gemini => "https://generativelanguage.googleapis.com/",
    }
}

pub struct ProviderClient {
    client: Client,
    provider: ProviderKind,
    api_key: String,
    model: String,
    base_url: Url,
}

impl ProviderClient {
    /// Creates a client pointed at the provider's production API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        provider: ProviderKind,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(
            provider,
            api_key,
            model,
            timeout_secs,
            default_base_url(provider),
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        provider: ProviderKind,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("aivis/0.1 (visibility-analysis)")
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            provider,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    #[must_use]
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Sends a single-turn prompt and returns the model's text answer.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RateLimited`] on HTTP 429.
    /// - [`ProviderError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ProviderError::Http`] on network failure.
    /// - [`ProviderError::Deserialize`] if the body does not match the
    ///   provider's response shape.
    /// - [`ProviderError::EmptyContent`] if the response carries no text.
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let text = match self.provider {
            ProviderKind::OpenAi => self.complete_openai(prompt).await?,
            ProviderKind::Anthropic => self.complete_anthropic(prompt).await?,
            ProviderKind::Gemini => self.complete_gemini(prompt).await?,
        };
        text.ok_or(ProviderError::EmptyContent {
            provider: self.provider,
        })
    }

    async fn complete_openai(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let url = self.endpoint("v1/chat/completions")?;
        let body = OpenAiChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: OPENAI_TEMPERATURE,
        };
        let request = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body);
        let response: OpenAiChatResponse = self.send(request, "openai chat completion").await?;
        Ok(response.into_text())
    }

    async fn complete_anthropic(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let url = self.endpoint("v1/messages")?;
        let body = AnthropicMessagesRequest {
            model: &self.model,
            max_tokens: ANTHROPIC_MAX_TOKENS,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let request = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        let response: AnthropicMessagesResponse =
            self.send(request, "anthropic messages").await?;
        Ok(response.into_text())
    }

    async fn complete_gemini(&self, prompt: &str) -> Result<Option<String>, ProviderError> {
        let url = self.endpoint(&format!("v1beta/models/{}:generateContent", self.model))?;
        let body = GeminiGenerateRequest {
            contents: vec![GeminiRequestContent {
                role: "user",
                parts: vec![GeminiRequestPart { text: prompt }],
            }],
        };
        let request = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        let response: GeminiGenerateResponse = self.send(request, "gemini generateContent").await?;
        Ok(response.into_text())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T, ProviderError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: self.provider,
            });
        }
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                provider: self.provider,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}
