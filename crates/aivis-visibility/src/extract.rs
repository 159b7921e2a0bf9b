//! Recover JSON from free-form model output.
//!
//! Models wrap JSON in prose, markdown fences, or both. [`extract`] walks an
//! ordered list of strategies and returns the first candidate that parses
//! *and* has the shape the caller asked for.

use std::fmt;
use std::sync::LazyLock;

use aivis_providers::is_mock_response;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static TAGGED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[ \t]*json\b[^\n]*\n(.*?)```").expect("valid tagged block regex")
});
static FENCED_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n`]*\n(.*?)```").expect("valid fenced block regex"));
static ARRAY_SCAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("valid array scan regex"));

/// Shape the caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// A JSON array of records (generated questions).
    QuestionList,
    /// A single JSON object (a scoring breakdown).
    ScoringRecord,
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuestionList => f.write_str("question list"),
            Self::ScoringRecord => f.write_str("scoring record"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Records(Vec<Value>),
    Record(Map<String, Value>),
}

impl ParsedValue {
    #[must_use]
    pub fn into_records(self) -> Option<Vec<Value>> {
        match self {
            Self::Records(items) => Some(items),
            Self::Record(_) => None,
        }
    }

    #[must_use]
    pub fn into_record(self) -> Option<Map<String, Value>> {
        match self {
            Self::Record(map) => Some(map),
            Self::Records(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("mock response: the provider has no credential configured")]
    MockResponse,

    #[error("could not extract valid structured data ({mode})")]
    NoStructuredData { mode: ExtractMode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    WholeText,
    TaggedJsonBlock,
    AnyFencedBlock,
    ArrayScan,
}

/// Tried in order; the first success wins.
const STRATEGIES: [Strategy; 4] = [
    Strategy::WholeText,
    Strategy::TaggedJsonBlock,
    Strategy::AnyFencedBlock,
    Strategy::ArrayScan,
];

impl Strategy {
    fn applies_to(self, mode: ExtractMode) -> bool {
        match self {
            Self::ArrayScan => mode == ExtractMode::QuestionList,
            Self::WholeText | Self::TaggedJsonBlock | Self::AnyFencedBlock => true,
        }
    }

    fn candidates(self, text: &str) -> Vec<&str> {
        match self {
            Self::WholeText => vec![text.trim()],
            Self::TaggedJsonBlock => capture_all(&TAGGED_BLOCK_RE, text),
            Self::AnyFencedBlock => capture_all(&FENCED_BLOCK_RE, text),
            Self::ArrayScan => ARRAY_SCAN_RE
                .find(text)
                .map(|m| vec![m.as_str()])
                .unwrap_or_default(),
        }
    }

    fn attempt(self, text: &str, mode: ExtractMode) -> Option<ParsedValue> {
        self.candidates(text).into_iter().find_map(|candidate| {
            let value = serde_json::from_str::<Value>(candidate.trim()).ok()?;
            shape(value, mode)
        })
    }
}

fn capture_all<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

fn shape(value: Value, mode: ExtractMode) -> Option<ParsedValue> {
    match (mode, value) {
        (ExtractMode::QuestionList, Value::Array(items)) => Some(ParsedValue::Records(items)),
        // `{"questions": [...]}` is a common wrapper around the list.
        (ExtractMode::QuestionList, Value::Object(mut map)) => match map.remove("questions") {
            Some(Value::Array(items)) => Some(ParsedValue::Records(items)),
            _ => None,
        },
        (ExtractMode::ScoringRecord, Value::Object(map)) => Some(ParsedValue::Record(map)),
        _ => None,
    }
}

/// Pull a value of the requested shape out of `raw_text`.
///
/// Mock sentinels are rejected before any parsing.
///
/// # Errors
///
/// [`ExtractError::MockResponse`] for a mock sentinel, otherwise
/// [`ExtractError::NoStructuredData`] when every strategy fails.
pub fn extract(raw_text: &str, mode: ExtractMode) -> Result<ParsedValue, ExtractError> {
    if is_mock_response(raw_text) {
        return Err(ExtractError::MockResponse);
    }

    STRATEGIES
        .into_iter()
        .filter(|strategy| strategy.applies_to(mode))
        .find_map(|strategy| {
            let parsed = strategy.attempt(raw_text, mode)?;
            tracing::debug!(?strategy, %mode, "structured data extracted");
            Some(parsed)
        })
        .ok_or(ExtractError::NoStructuredData { mode })
}
