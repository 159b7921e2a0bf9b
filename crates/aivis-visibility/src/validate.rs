//! Schema and quality checks for generated questions.

use std::fmt;

use serde_json::{Map, Value};

use crate::types::{Question, QuestionIntent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    pub min_text_length: usize,
    pub max_text_length: usize,
    pub allowed_intents: Vec<QuestionIntent>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_text_length: 10,
            max_text_length: 200,
            allowed_intents: QuestionIntent::ALL.to_vec(),
        }
    }
}

/// One reason a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionIssue {
    pub index: usize,
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for QuestionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "question {} `{}`: {}", self.index, self.field, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// `true` only when no candidate produced an issue.
    pub valid: bool,
    pub accepted: Vec<Question>,
    pub errors: Vec<QuestionIssue>,
}

/// Partition `candidates` into accepted questions and per-field issues.
///
/// A candidate with any issue is excluded, but the others are still
/// accepted. Accepted text is trimmed and the language lowercased.
#[must_use]
pub fn validate_questions(candidates: &[Value], config: &ValidationConfig) -> ValidationReport {
    let mut accepted = Vec::new();
    let mut errors = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        let Value::Object(record) = candidate else {
            errors.push(QuestionIssue {
                index,
                field: "question",
                reason: "must be an object".to_string(),
            });
            continue;
        };

        let before = errors.len();
        let text = check_text(record, index, config, &mut errors);
        let intent = check_intent(record, index, config, &mut errors);
        let language = check_language(record, index, &mut errors);

        if errors.len() > before {
            continue;
        }
        if let (Some(text), Some(intent), Some(language)) = (text, intent, language) {
            accepted.push(Question {
                id: question_id(record, index),
                text,
                language,
                intent,
            });
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        accepted,
        errors,
    }
}

fn check_text(
    record: &Map<String, Value>,
    index: usize,
    config: &ValidationConfig,
    errors: &mut Vec<QuestionIssue>,
) -> Option<String> {
    let mut issue = |reason: String| {
        errors.push(QuestionIssue {
            index,
            field: "text",
            reason,
        });
        None
    };

    let Some(Value::String(raw)) = record.get("text") else {
        return issue("must be a string".to_string());
    };
    let text = raw.trim();
    let length = text.chars().count();
    if length == 0 {
        return issue("must not be empty".to_string());
    }
    if length < config.min_text_length {
        return issue(format!(
            "is {length} characters, minimum is {}",
            config.min_text_length
        ));
    }
    if length > config.max_text_length {
        return issue(format!(
            "is {length} characters, maximum is {}",
            config.max_text_length
        ));
    }
    Some(text.to_string())
}

fn check_intent(
    record: &Map<String, Value>,
    index: usize,
    config: &ValidationConfig,
    errors: &mut Vec<QuestionIssue>,
) -> Option<QuestionIntent> {
    let parsed = match record.get("intent") {
        Some(Value::String(raw)) => raw.parse::<QuestionIntent>().ok(),
        _ => {
            errors.push(QuestionIssue {
                index,
                field: "intent",
                reason: "must be a string".to_string(),
            });
            return None;
        }
    };

    match parsed {
        Some(intent) if config.allowed_intents.contains(&intent) => Some(intent),
        _ => {
            let allowed: Vec<&str> = config
                .allowed_intents
                .iter()
                .map(|i| i.as_str())
                .collect();
            errors.push(QuestionIssue {
                index,
                field: "intent",
                reason: format!("must be one of {}", allowed.join(", ")),
            });
            None
        }
    }
}

fn check_language(
    record: &Map<String, Value>,
    index: usize,
    errors: &mut Vec<QuestionIssue>,
) -> Option<String> {
    let language = match record.get("language") {
        Some(Value::String(raw)) => raw.trim().to_lowercase(),
        _ => {
            errors.push(QuestionIssue {
                index,
                field: "language",
                reason: "must be a string".to_string(),
            });
            return None;
        }
    };

    if language.len() == 2 && language.chars().all(|c| c.is_ascii_lowercase()) {
        Some(language)
    } else {
        errors.push(QuestionIssue {
            index,
            field: "language",
            reason: format!("'{language}' is not a two-letter language code"),
        });
        None
    }
}

fn question_id(record: &Map<String, Value>, index: usize) -> String {
    match record.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("q{}", index + 1),
    }
}
