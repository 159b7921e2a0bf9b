use aivis_core::ProviderKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {provider}")]
    RateLimited { provider: ProviderKind },

    #[error("unexpected HTTP status {status} from {provider}")]
    UnexpectedStatus { provider: ProviderKind, status: u16 },

    #[error("{provider} response contained no text content")]
    EmptyContent { provider: ProviderKind },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
