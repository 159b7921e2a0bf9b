use aivis_core::ConfigError;
use thiserror::Error;

/// Failures surfaced by [`crate::run_analysis`].
///
/// Provider, extraction and scoring failures never appear here: they are
/// absorbed by the fallback paths and logged.
#[derive(Debug, Error)]
pub enum VisibilityError {
    #[error("invalid company profile: {0}")]
    InvalidProfile(#[from] ConfigError),
}
