//! Substring-based scoring and service attribution.
//!
//! Used directly when LLM scoring is disabled and as the fallback for every
//! LLM scoring failure.

use aivis_core::CompanyProfile;

use crate::types::HeuristicScore;

/// Service name used when the company lists no services.
pub const GENERAL_SERVICE: &str = "general";

const BOTH_SCORE: f64 = 0.9;
const COMPANY_ONLY_SCORE: f64 = 0.6;
const SERVICE_ONLY_SCORE: f64 = 0.2;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Score `answer_text` by whether it names the company and `service`.
#[must_use]
pub fn heuristic_score(company: &CompanyProfile, service: &str, answer_text: &str) -> HeuristicScore {
    let company_mentioned = contains_ci(answer_text, &company.name);
    let service_matched = contains_ci(answer_text, service);

    let (score, rationale) = match (company_mentioned, service_matched) {
        (true, true) => (
            BOTH_SCORE,
            format!(
                "{} is mentioned in an answer about {service}.",
                company.name
            ),
        ),
        (true, false) => (
            COMPANY_ONLY_SCORE,
            format!(
                "{} is mentioned, but the answer does not reference {service}.",
                company.name
            ),
        ),
        (false, true) => (
            SERVICE_ONLY_SCORE,
            format!(
                "The answer covers {service} without mentioning {}.",
                company.name
            ),
        ),
        (false, false) => (
            0.0,
            format!(
                "Neither {} nor {service} appears in the answer.",
                company.name
            ),
        ),
    };

    HeuristicScore {
        score,
        rationale,
        company_mentioned,
        service_matched,
    }
}

/// Pick the service a (question, answer) pair is about.
///
/// First company service named in the question, else the first named in the
/// answer, else the first listed service, else [`GENERAL_SERVICE`].
#[must_use]
pub fn attribute_service(company: &CompanyProfile, question_text: &str, answer_text: &str) -> String {
    let named_in = |text: &str| {
        company
            .services
            .iter()
            .find(|service| contains_ci(text, service))
    };

    named_in(question_text)
        .or_else(|| named_in(answer_text))
        .or_else(|| company.services.first())
        .map_or_else(|| GENERAL_SERVICE.to_string(), Clone::clone)
}
