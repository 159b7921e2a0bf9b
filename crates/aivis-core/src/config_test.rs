use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "AIVIS_ENV"));
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.providers.openai_api_key.is_none());
    assert_eq!(cfg.providers.openai_model, DEFAULT_OPENAI_MODEL);
    assert_eq!(cfg.providers.request_timeout_secs, 60);
    assert_eq!(cfg.providers.max_retries, 2);
    assert_eq!(cfg.providers.backoff_base_ms, 500);
    assert!(cfg.scoring.enabled);
    assert!(cfg.scoring.preferred_provider.is_none());
    assert!(cfg.scoring.weights_json.is_none());
    assert_eq!(cfg.question_count, 5);
    assert_eq!(cfg.metadata_timeout_secs, 5);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("AIVIS_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AIVIS_BIND_ADDR"),
        "expected InvalidEnvVar(AIVIS_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn blank_api_keys_are_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "   ");
    map.insert("GEMINI_API_KEY", "g-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.providers.has_credential(ProviderKind::OpenAi));
    assert!(cfg.providers.has_credential(ProviderKind::Gemini));
    assert_eq!(cfg.providers.api_key(ProviderKind::Gemini), Some("g-key"));
}

#[test]
fn scoring_switch_accepts_common_spellings() {
    for (raw, expected) in [("false", false), ("0", false), ("OFF", false), ("yes", true)] {
        let mut map = HashMap::new();
        map.insert("AIVIS_LLM_SCORING_ENABLED", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.scoring.enabled, expected, "raw value {raw}");
    }
}

#[test]
fn scoring_switch_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("AIVIS_LLM_SCORING_ENABLED", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AIVIS_LLM_SCORING_ENABLED"),
        "expected InvalidEnvVar(AIVIS_LLM_SCORING_ENABLED), got: {result:?}"
    );
}

#[test]
fn preferred_scoring_provider_is_parsed() {
    let mut map = HashMap::new();
    map.insert("AIVIS_LLM_SCORING_PROVIDER", "claude");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scoring.preferred_provider, Some(ProviderKind::Anthropic));
}

#[test]
fn unknown_scoring_provider_fails() {
    let mut map = HashMap::new();
    map.insert("AIVIS_LLM_SCORING_PROVIDER", "mistral");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AIVIS_LLM_SCORING_PROVIDER"),
        "expected InvalidEnvVar(AIVIS_LLM_SCORING_PROVIDER), got: {result:?}"
    );
}

#[test]
fn weights_json_is_kept_raw() {
    let mut map = HashMap::new();
    map.insert("AIVIS_LLM_SCORING_WEIGHTS", "{not json");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scoring.weights_json.as_deref(), Some("{not json"));
}

#[test]
fn question_count_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("AIVIS_QUESTION_COUNT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AIVIS_QUESTION_COUNT"),
        "expected InvalidEnvVar(AIVIS_QUESTION_COUNT), got: {result:?}"
    );
}

#[test]
fn provider_timeout_override() {
    let mut map = HashMap::new();
    map.insert("AIVIS_PROVIDER_TIMEOUT_SECS", "15");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.providers.request_timeout_secs, 15);
}

#[test]
fn provider_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("AIVIS_PROVIDER_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AIVIS_PROVIDER_TIMEOUT_SECS"),
        "expected InvalidEnvVar(AIVIS_PROVIDER_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_api_keys() {
    let mut map = HashMap::new();
    map.insert("ANTHROPIC_API_KEY", "sk-secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-secret-value"));
    assert!(rendered.contains("[redacted]"));
}
