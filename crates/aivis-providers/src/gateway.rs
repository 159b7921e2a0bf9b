//! Provider gateway: credential checks plus answer generation.

use std::collections::HashMap;

use aivis_core::{ProviderKind, ProviderSettings};
use async_trait::async_trait;

use crate::client::ProviderClient;
use crate::error::ProviderError;
use crate::retry::retry_with_backoff;

/// Single-shot text completion over the fixed set of named providers.
///
/// Implementations must treat a missing credential as a normal condition:
/// [`LlmGateway::generate_answer`] then returns a mock sentinel (see
/// [`mock_response`]) rather than an error.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Whether `provider` has a usable credential. Says nothing about
    /// network reachability.
    fn has_credential(&self, provider: ProviderKind) -> bool;

    /// Send `prompt` to `provider` and return its text answer.
    async fn generate_answer(
        &self,
        provider: ProviderKind,
        prompt: &str,
    ) -> Result<String, ProviderError>;
}

/// Build the stub answer returned in place of a real call when `provider`
/// has no credential. Always starts with `[` and contains `MOCK]`.
/// Never echoes the prompt.
#[must_use]
pub fn mock_response(provider: ProviderKind) -> String {
    format!(
        "[{} MOCK] No API key configured for {provider}; this is a placeholder answer.",
        provider.mock_label()
    )
}

/// Whether `text` is a mock sentinel rather than real model output.
#[must_use]
pub fn is_mock_response(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('[') && trimmed.contains("MOCK]")
}

/// Production [`LlmGateway`] backed by one [`ProviderClient`] per
/// credentialed provider.
pub struct ProviderGateway {
    clients: HashMap<ProviderKind, ProviderClient>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ProviderGateway {
    /// Build a gateway talking to the production APIs.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if an HTTP client cannot be constructed.
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Self::with_base_urls(settings, &HashMap::new())
    }

    /// Build a gateway with per-provider base URL overrides (for tests).
    ///
    /// Providers without an override use their production API root.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if an HTTP client cannot be constructed or
    /// an override URL is invalid.
    pub fn with_base_urls(
        settings: &ProviderSettings,
        base_urls: &HashMap<ProviderKind, String>,
    ) -> Result<Self, ProviderError> {
        let mut clients = HashMap::new();
        for provider in ProviderKind::ALL {
            let Some(api_key) = settings.api_key(provider) else {
                tracing::info!(
                    provider = %provider,
                    "no API key configured, provider will answer with mock responses"
                );
                continue;
            };
            let client = match base_urls.get(&provider) {
                Some(base_url) => ProviderClient::with_base_url(
                    provider,
                    api_key,
                    settings.model(provider),
                    settings.request_timeout_secs,
                    base_url,
                )?,
                None => ProviderClient::new(
                    provider,
                    api_key,
                    settings.model(provider),
                    settings.request_timeout_secs,
                )?,
            };
            clients.insert(provider, client);
        }

        Ok(Self {
            clients,
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }
}

#[async_trait]
impl LlmGateway for ProviderGateway {
    fn has_credential(&self, provider: ProviderKind) -> bool {
        self.clients.contains_key(&provider)
    }

    async fn generate_answer(
        &self,
        provider: ProviderKind,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let Some(client) = self.clients.get(&provider) else {
            return Ok(mock_response(provider));
        };

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            client.complete(prompt)
        })
        .await
    }
}
