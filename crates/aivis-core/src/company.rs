use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Locale used when a profile does not name any target locales.
pub const DEFAULT_LOCALE: &str = "en";

/// The company whose AI-assistant visibility is being analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_locales: Vec<String>,
}

impl CompanyProfile {
    /// Return a trimmed copy of the profile, rejecting unusable input.
    ///
    /// Service names and locales are trimmed, blank entries dropped and
    /// duplicates removed (first occurrence wins). Locales are lowercased and
    /// reduced to their language part.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the company name is empty or a
    /// locale is not a two-letter code.
    pub fn normalized(&self) -> Result<Self, ConfigError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "company name must be non-empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let services = self
            .services
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert((*s).to_string()))
            .map(ToOwned::to_owned)
            .collect();

        let mut target_locales = Vec::new();
        for raw in &self.target_locales {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Region tags such as `de-DE` or `pt_BR` reduce to the language.
            let locale = trimmed
                .split(['-', '_'])
                .next()
                .unwrap_or_default()
                .to_lowercase();
            if locale.len() != 2 || !locale.chars().all(|c| c.is_ascii_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "target locale '{raw}' must be a two-letter language code"
                )));
            }
            if !target_locales.contains(&locale) {
                target_locales.push(locale);
            }
        }

        let website = self
            .website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            services,
            website,
            target_locales,
        })
    }

    /// Target locales, falling back to [`DEFAULT_LOCALE`].
    #[must_use]
    pub fn locales(&self) -> Vec<String> {
        if self.target_locales.is_empty() {
            vec![DEFAULT_LOCALE.to_string()]
        } else {
            self.target_locales.clone()
        }
    }
}

/// Load and validate a company profile from a YAML or JSON file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_company_profile(path: &Path) -> Result<CompanyProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    // YAML is a superset of JSON, so one parser covers both file flavours.
    let profile: CompanyProfile = serde_yaml::from_str(&content)?;

    profile.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, services: &[&str]) -> CompanyProfile {
        CompanyProfile {
            name: name.to_string(),
            description: String::new(),
            services: services.iter().map(|s| (*s).to_string()).collect(),
            website: None,
            target_locales: vec![],
        }
    }

    #[test]
    fn normalized_rejects_empty_name() {
        let err = profile("   ", &["backup"]).normalized().unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn normalized_trims_and_dedups_services() {
        let p = profile(" Acme Cloud ", &[" backup", "", "backup", "storage "])
            .normalized()
            .unwrap();
        assert_eq!(p.name, "Acme Cloud");
        assert_eq!(p.services, vec!["backup", "storage"]);
    }

    #[test]
    fn normalized_lowercases_locales() {
        let mut p = profile("Acme", &[]);
        p.target_locales = vec!["EN".to_string(), " de ".to_string(), "en".to_string()];
        let p = p.normalized().unwrap();
        assert_eq!(p.target_locales, vec!["en", "de"]);
    }

    #[test]
    fn normalized_reduces_region_tags_to_language() {
        let mut p = profile("Acme", &[]);
        p.target_locales = vec!["de-DE".to_string(), "pt_BR".to_string(), "DE".to_string()];
        let p = p.normalized().unwrap();
        assert_eq!(p.target_locales, vec!["de", "pt"]);
    }

    #[test]
    fn normalized_rejects_bad_locale() {
        let mut p = profile("Acme", &[]);
        p.target_locales = vec!["english".to_string()];
        let err = p.normalized().unwrap_err();
        assert!(err.to_string().contains("two-letter"));
    }

    #[test]
    fn locales_default_to_english() {
        assert_eq!(profile("Acme", &[]).locales(), vec![DEFAULT_LOCALE]);
    }

    #[test]
    fn blank_website_becomes_none() {
        let mut p = profile("Acme", &[]);
        p.website = Some("  ".to_string());
        assert!(p.normalized().unwrap().website.is_none());
    }

    #[test]
    fn deserializes_camel_case_json() {
        let json = r#"{"name":"Acme Cloud","services":["backup"],"targetLocales":["en"]}"#;
        let p: CompanyProfile = serde_json::from_str(json).expect("parse");
        assert_eq!(p.target_locales, vec!["en"]);
        assert!(p.description.is_empty());
    }

    #[test]
    fn load_company_profile_reads_yaml_file() {
        let path = std::env::temp_dir().join(format!(
            "aivis-profile-{}.yaml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "name: Acme Cloud\ndescription: Offsite backups\nservices:\n  - backup\n",
        )
        .expect("write fixture");
        let result = load_company_profile(&path);
        std::fs::remove_file(&path).ok();
        let p = result.expect("load profile");
        assert_eq!(p.name, "Acme Cloud");
        assert_eq!(p.services, vec!["backup"]);
    }

    #[test]
    fn load_company_profile_reports_missing_file() {
        let err = load_company_profile(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileIo { .. }));
    }
}
