//! Per-service insights and recommendations.

use std::collections::HashMap;

use aivis_core::{CompanyProfile, ProviderKind};
use aivis_providers::{is_mock_response, LlmGateway};
use futures::future::join_all;

use crate::types::{DashboardInsight, ProviderRun, Question, Recommendation, VisibilityScore};

pub const WELL_REPRESENTED: &str = "well represented";
pub const MODERATE_VISIBILITY: &str = "moderate visibility, room for improvement";
pub const ALMOST_INVISIBLE: &str = "almost invisible, needs active optimization";

const STRONG_THRESHOLD: f64 = 0.75;
const MODERATE_THRESHOLD: f64 = 0.4;
const MAX_BULLETS: usize = 3;
const MAX_PROMPT_QUESTIONS: usize = 5;

const REINFORCE_DESCRIPTION: &str = "Reinforce your positioning: keep service pages, case \
    studies and third-party reviews current so assistants keep citing you for this service.";
const ENHANCE_DESCRIPTION: &str = "Enhance your descriptions: publish clear, specific pages \
    about this service and earn mentions on review and comparison sites.";

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub insights: Vec<DashboardInsight>,
    pub recommendations: Vec<Recommendation>,
}

/// Qualitative band for an average score. Lower bounds are inclusive.
#[must_use]
pub fn band_comment(avg_score: f64) -> &'static str {
    if avg_score >= STRONG_THRESHOLD {
        WELL_REPRESENTED
    } else if avg_score >= MODERATE_THRESHOLD {
        MODERATE_VISIBILITY
    } else {
        ALMOST_INVISIBLE
    }
}

/// Group scores by exact service name and average them.
///
/// Insights come out in the order each service was first seen. Services
/// without any score never appear.
#[must_use]
pub fn build_insights<'a>(scores: impl IntoIterator<Item = &'a VisibilityScore>) -> Vec<DashboardInsight> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();

    for score in scores {
        let bucket = groups.entry(score.service.as_str()).or_insert_with(|| {
            order.push(score.service.as_str());
            Vec::new()
        });
        bucket.push(score.score);
    }

    order
        .into_iter()
        .filter_map(|service| {
            let values = groups.get(service)?;
            if values.is_empty() {
                return None;
            }
            #[allow(clippy::cast_precision_loss)]
            let avg_score = values.iter().sum::<f64>() / values.len() as f64;
            Some(DashboardInsight {
                service: service.to_string(),
                avg_score,
                sample_count: values.len(),
                comments: vec![band_comment(avg_score).to_string()],
            })
        })
        .collect()
}

/// Build insights from every provider run, then one recommendation per
/// insight. Recommendations are generated concurrently; a failed
/// enrichment only affects its own insight.
pub async fn aggregate(
    gateway: &dyn LlmGateway,
    company: &CompanyProfile,
    questions: &[Question],
    runs: &[ProviderRun],
) -> Dashboard {
    let insights = build_insights(runs.iter().flat_map(|run| run.scores.iter()));

    let recommendations = join_all(
        insights
            .iter()
            .map(|insight| build_recommendation(gateway, company, questions, insight)),
    )
    .await;

    Dashboard {
        insights,
        recommendations,
    }
}

/// Recommendation for one insight, LLM-enriched when possible.
pub async fn build_recommendation(
    gateway: &dyn LlmGateway,
    company: &CompanyProfile,
    questions: &[Question],
    insight: &DashboardInsight,
) -> Recommendation {
    let description = match enrich(gateway, company, questions, insight).await {
        Some(description) => description,
        None => fallback_description(insight.avg_score).to_string(),
    };

    let title = if insight.avg_score >= STRONG_THRESHOLD {
        format!("Maintain strong visibility for {}", insight.service)
    } else {
        format!("Improve visibility for {}", insight.service)
    };

    Recommendation {
        service: insight.service.clone(),
        title,
        description,
        suggested_prompts: suggested_prompts(&company.name, &insight.service),
    }
}

#[must_use]
pub fn fallback_description(avg_score: f64) -> &'static str {
    if avg_score >= STRONG_THRESHOLD {
        REINFORCE_DESCRIPTION
    } else {
        ENHANCE_DESCRIPTION
    }
}

/// Two prompts the company can use to re-check its visibility.
#[must_use]
pub fn suggested_prompts(company_name: &str, service: &str) -> Vec<String> {
    vec![
        format!("Which companies offer {service}, and is {company_name} a good choice?"),
        format!("Compare {company_name} with other {service} providers."),
    ]
}

/// Split a bulleted answer into at most three trimmed fragments.
#[must_use]
pub fn split_bullets(text: &str) -> Vec<String> {
    text.split(['\n', '\r', '•', '-', '–', '—', '*'])
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .take(MAX_BULLETS)
        .map(ToOwned::to_owned)
        .collect()
}

async fn enrich(
    gateway: &dyn LlmGateway,
    company: &CompanyProfile,
    questions: &[Question],
    insight: &DashboardInsight,
) -> Option<String> {
    let provider = ProviderKind::ALL
        .into_iter()
        .find(|p| gateway.has_credential(*p))?;

    let prompt = build_recommendation_prompt(company, questions, insight);
    let text = match gateway.generate_answer(provider, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                provider = %provider,
                service = %insight.service,
                error = %e,
                "recommendation call failed, using fallback"
            );
            return None;
        }
    };

    if is_mock_response(&text) {
        return None;
    }

    let bullets = split_bullets(&text);
    if bullets.is_empty() {
        tracing::warn!(
            provider = %provider,
            service = %insight.service,
            "recommendation response was empty, using fallback"
        );
        return None;
    }
    Some(bullets.join(" "))
}

fn build_recommendation_prompt(
    company: &CompanyProfile,
    questions: &[Question],
    insight: &DashboardInsight,
) -> String {
    let asked: Vec<String> = questions
        .iter()
        .take(MAX_PROMPT_QUESTIONS)
        .map(|q| format!("- {}", q.text))
        .collect();

    format!(
        "{company} wants to be recommended more often by AI assistants for {service}.\n\
         Its average visibility score across assistants is {avg:.2} ({band}).\n\
         Customer questions that were asked:\n{asked}\n\n\
         Give 2-3 short, concrete bullet points on how {company} can improve its \
         visibility for {service}. Respond with the bullet points only.",
        company = company.name,
        service = insight.service,
        avg = insight.avg_score,
        band = band_comment(insight.avg_score),
        asked = asked.join("\n"),
    )
}
