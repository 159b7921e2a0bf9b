pub mod app_config;
pub mod company;
pub mod config;
pub mod provider;

pub use app_config::{AppConfig, Environment, ProviderSettings, ScoringSettings};
pub use company::{load_company_profile, CompanyProfile, DEFAULT_LOCALE};
pub use config::{load_app_config, load_app_config_from_env};
pub use provider::ProviderKind;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read company profile {path}: {source}")]
    ProfileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse company profile: {0}")]
    ProfileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
