//! Language-model provider gateway for the visibility analyzer.
//!
//! Wraps the OpenAI, Anthropic and Gemini completion endpoints behind the
//! [`LlmGateway`] trait. Providers without a configured API key answer with a
//! recognizable mock sentinel instead of making a network call. Also hosts the
//! best-effort website metadata fetcher.

pub mod client;
pub mod error;
pub mod gateway;
pub mod metadata;
pub mod types;

mod retry;

pub use client::ProviderClient;
pub use error::ProviderError;
pub use gateway::{is_mock_response, mock_response, LlmGateway, ProviderGateway};
pub use metadata::{extract_meta_description, fetch_page_meta_description};
