//! Visibility scoring and aggregation pipeline.
//!
//! Generates customer questions for a company, asks every configured LLM
//! provider, scores whether and how the company shows up in each answer, and
//! rolls the scores up into per-service insights and recommendations.

pub mod aggregate;
pub mod calculator;
pub mod error;
pub mod extract;
pub mod heuristic;
pub mod normalize;
pub mod orchestrator;
pub mod pipeline;
pub mod questions;
pub mod types;
pub mod validate;

pub use aggregate::{aggregate, build_insights, Dashboard};
pub use calculator::calculate;
pub use error::VisibilityError;
pub use extract::{extract, ExtractError, ExtractMode, ParsedValue};
pub use heuristic::{attribute_service, heuristic_score};
pub use normalize::normalize_breakdown;
pub use orchestrator::VisibilityScorer;
pub use pipeline::{run_analysis, AnalysisSettings};
pub use questions::generate_questions;
pub use types::{
    AnalysisReport, DashboardInsight, HeuristicScore, ProviderRun, Question, QuestionIntent,
    RawAnswer, Recommendation, ScoreOutcome, ScoringBreakdown, ScoringWeights, VisibilityScore,
};
pub use validate::{validate_questions, QuestionIssue, ValidationConfig, ValidationReport};

#[cfg(test)]
mod testing;
