use crate::app_config::{AppConfig, Environment, ProviderSettings, ScoringSettings};
use crate::provider::ProviderKind;
use crate::ConfigError;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional: missing provider keys put the gateway into
/// mock mode rather than failing startup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("AIVIS_ENV", "development"))?;

    let bind_addr = or_default("AIVIS_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("AIVIS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("AIVIS_LOG_LEVEL", "info");

    let providers = ProviderSettings {
        openai_api_key: optional("OPENAI_API_KEY"),
        anthropic_api_key: optional("ANTHROPIC_API_KEY"),
        gemini_api_key: optional("GEMINI_API_KEY"),
        openai_model: or_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
        anthropic_model: or_default("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
        gemini_model: or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        request_timeout_secs: parse_u64("AIVIS_PROVIDER_TIMEOUT_SECS", "60")?,
        max_retries: parse_u32("AIVIS_PROVIDER_MAX_RETRIES", "2")?,
        backoff_base_ms: parse_u64("AIVIS_PROVIDER_BACKOFF_BASE_MS", "500")?,
    };

    let enabled = parse_bool(&or_default("AIVIS_LLM_SCORING_ENABLED", "true"))
        .ok_or_else(|| {
            invalid(
                "AIVIS_LLM_SCORING_ENABLED",
                "expected true/false, 1/0, yes/no or on/off".to_string(),
            )
        })?;
    let preferred_provider = optional("AIVIS_LLM_SCORING_PROVIDER")
        .map(|raw| raw.parse::<ProviderKind>())
        .transpose()
        .map_err(|reason| invalid("AIVIS_LLM_SCORING_PROVIDER", reason))?;
    let scoring = ScoringSettings {
        enabled,
        preferred_provider,
        weights_json: optional("AIVIS_LLM_SCORING_WEIGHTS"),
    };

    let question_count = parse_usize("AIVIS_QUESTION_COUNT", "5")?;
    if question_count == 0 {
        return Err(invalid(
            "AIVIS_QUESTION_COUNT",
            "must be at least 1".to_string(),
        ));
    }
    let metadata_timeout_secs = parse_u64("AIVIS_METADATA_TIMEOUT_SECS", "5")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        providers,
        scoring,
        question_count,
        metadata_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
