//! Values produced and consumed by one analysis run.
//!
//! Everything here serializes as camelCase JSON, the shape returned by the
//! HTTP API and printed by the CLI.

use std::fmt;
use std::str::FromStr;

use aivis_core::{CompanyProfile, ProviderKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the asker is trying to achieve with a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionIntent {
    FindService,
    EvaluateCompany,
    CompareOptions,
    Pricing,
    Reviews,
    Features,
    Alternatives,
}

impl QuestionIntent {
    pub const ALL: [QuestionIntent; 7] = [
        QuestionIntent::FindService,
        QuestionIntent::EvaluateCompany,
        QuestionIntent::CompareOptions,
        QuestionIntent::Pricing,
        QuestionIntent::Reviews,
        QuestionIntent::Features,
        QuestionIntent::Alternatives,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FindService => "find_service",
            Self::EvaluateCompany => "evaluate_company",
            Self::CompareOptions => "compare_options",
            Self::Pricing => "pricing",
            Self::Reviews => "reviews",
            Self::Features => "features",
            Self::Alternatives => "alternatives",
        }
    }
}

impl fmt::Display for QuestionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionIntent {
    type Err = String;

    /// Exact match on the snake_case name, like serde.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| format!("unknown question intent '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Two-letter lowercase language code.
    pub language: String,
    pub intent: QuestionIntent,
}

/// One provider's answer to one question, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnswer {
    pub question_id: String,
    pub question_text: String,
    pub answer_text: String,
}

/// Structured judgement of one answer, as produced by LLM scoring.
///
/// The six factors are in `[0, 1]` once normalized. `mention_count` is a
/// plain count and is never clamped to the unit interval.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringBreakdown {
    pub mention_presence: f64,
    pub mention_context: f64,
    pub mention_position: f64,
    pub description_detail: f64,
    pub answer_relevance: f64,
    pub service_match: f64,
    pub mention_count: u32,
    pub rationale: String,
}

/// Relative importance of each breakdown factor.
///
/// Weights need not sum to 1; [`ScoringWeights::normalized`] rescales them.
/// Deserialization accepts camelCase or snake_case keys and fills missing
/// keys from the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringWeights {
    #[serde(alias = "mention_presence")]
    pub mention_presence: f64,
    #[serde(alias = "mention_context")]
    pub mention_context: f64,
    #[serde(alias = "mention_position")]
    pub mention_position: f64,
    #[serde(alias = "description_detail")]
    pub description_detail: f64,
    #[serde(alias = "answer_relevance")]
    pub answer_relevance: f64,
    #[serde(alias = "service_match")]
    pub service_match: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            mention_presence: 0.20,
            mention_context: 0.25,
            mention_position: 0.15,
            description_detail: 0.20,
            answer_relevance: 0.10,
            service_match: 0.10,
        }
    }
}

impl ScoringWeights {
    fn as_array(&self) -> [f64; 6] {
        [
            self.mention_presence,
            self.mention_context,
            self.mention_position,
            self.description_detail,
            self.answer_relevance,
            self.service_match,
        ]
    }

    /// Rescale so the weights sum to 1.0.
    ///
    /// Negative or non-finite weights count as 0. If nothing positive is
    /// left the default weights are returned instead.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let clean = self
            .as_array()
            .map(|w| if w.is_finite() && w > 0.0 { w } else { 0.0 });
        let sum: f64 = clean.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Self::default().normalized();
        }
        let [p, c, pos, d, r, s] = clean.map(|w| w / sum);
        Self {
            mention_presence: p,
            mention_context: c,
            mention_position: pos,
            description_detail: d,
            answer_relevance: r,
            service_match: s,
        }
    }
}

/// Final score for one (provider, question) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityScore {
    pub provider: ProviderKind,
    pub question_id: String,
    pub service: String,
    pub score: f64,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoringBreakdown>,
}

/// Substring-based score used when LLM scoring is off or fails.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicScore {
    pub score: f64,
    pub rationale: String,
    pub company_mentioned: bool,
    pub service_matched: bool,
}

/// Result of the scoring orchestrator for one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub score: f64,
    /// Present only when an LLM produced a usable breakdown.
    pub breakdown: Option<ScoringBreakdown>,
    pub rationale: String,
}

impl ScoreOutcome {
    #[must_use]
    pub fn from_heuristic(heuristic: &HeuristicScore) -> Self {
        Self {
            score: heuristic.score,
            breakdown: None,
            rationale: heuristic.rationale.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInsight {
    pub service: String,
    pub avg_score: f64,
    pub sample_count: usize,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub service: String,
    pub title: String,
    pub description: String,
    pub suggested_prompts: Vec<String>,
}

/// Everything one provider contributed to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRun {
    pub provider: ProviderKind,
    pub answers: Vec<RawAnswer>,
    pub scores: Vec<VisibilityScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderRun {
    #[must_use]
    pub fn failed(provider: ProviderKind, error: String) -> Self {
        Self {
            provider,
            answers: Vec::new(),
            scores: Vec::new(),
            error: Some(error),
        }
    }
}

/// Full result of [`crate::run_analysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub company: CompanyProfile,
    pub questions: Vec<Question>,
    pub providers: Vec<ProviderRun>,
    pub insights: Vec<DashboardInsight>,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}
