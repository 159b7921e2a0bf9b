//! End-to-end analysis orchestration.

use std::sync::Arc;

use aivis_core::{AppConfig, CompanyProfile, ProviderKind, ScoringSettings};
use aivis_providers::{fetch_page_meta_description, LlmGateway, ProviderError};
use chrono::Utc;
use futures::future::join_all;

use crate::aggregate::aggregate;
use crate::error::VisibilityError;
use crate::heuristic::{attribute_service, heuristic_score};
use crate::orchestrator::VisibilityScorer;
use crate::questions::generate_questions;
use crate::types::{AnalysisReport, ProviderRun, Question, RawAnswer, VisibilityScore};

/// The parts of [`AppConfig`] one analysis run needs.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub scoring: ScoringSettings,
    pub question_count: usize,
    pub metadata_timeout_secs: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            scoring: ScoringSettings::default(),
            question_count: 5,
            metadata_timeout_secs: 5,
        }
    }
}

impl From<&AppConfig> for AnalysisSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            scoring: config.scoring.clone(),
            question_count: config.question_count,
            metadata_timeout_secs: config.metadata_timeout_secs,
        }
    }
}

/// Run the full visibility analysis for one company.
///
/// 1. Validate the profile.
/// 2. Fill an empty description from the website's meta description.
/// 3. Generate questions.
/// 4. Ask every provider every question, providers concurrently and
///    questions in order, scoring each answer as it arrives.
/// 5. Aggregate into insights and recommendations.
///
/// A provider that fails mid-run contributes an empty [`ProviderRun`] with
/// `error` set; the rest of the run continues.
///
/// # Errors
///
/// Returns [`VisibilityError::InvalidProfile`] if the profile has no company
/// name or an unusable locale.
pub async fn run_analysis(
    gateway: Arc<dyn LlmGateway>,
    settings: &AnalysisSettings,
    profile: &CompanyProfile,
) -> Result<AnalysisReport, VisibilityError> {
    let mut company = profile.normalized()?;

    if company.description.is_empty() {
        if let Some(website) = company.website.as_deref() {
            if let Some(description) =
                fetch_page_meta_description(&website_url(website), settings.metadata_timeout_secs)
                    .await
            {
                tracing::debug!(website, "company description filled from website metadata");
                company.description = description;
            }
        }
    }

    let questions =
        generate_questions(gateway.as_ref(), &company, settings.question_count).await;
    tracing::info!(
        company = %company.name,
        questions = questions.len(),
        "starting provider runs"
    );

    let scorer = VisibilityScorer::new(Arc::clone(&gateway), settings.scoring.clone());
    let providers = join_all(
        ProviderKind::ALL
            .map(|provider| run_provider(gateway.as_ref(), &scorer, provider, &company, &questions)),
    )
    .await;

    let dashboard = aggregate(gateway.as_ref(), &company, &questions, &providers).await;

    Ok(AnalysisReport {
        company,
        questions,
        providers,
        insights: dashboard.insights,
        recommendations: dashboard.recommendations,
        generated_at: Utc::now(),
    })
}

fn website_url(website: &str) -> String {
    if website.starts_with("http://") || website.starts_with("https://") {
        website.to_string()
    } else {
        format!("https://{website}")
    }
}

async fn run_provider(
    gateway: &dyn LlmGateway,
    scorer: &VisibilityScorer,
    provider: ProviderKind,
    company: &CompanyProfile,
    questions: &[Question],
) -> ProviderRun {
    match answer_questions(gateway, scorer, provider, company, questions).await {
        Ok(run) => {
            tracing::info!(provider = %provider, answers = run.answers.len(), "provider run complete");
            run
        }
        Err(e) => {
            tracing::warn!(provider = %provider, error = %e, "provider run failed");
            ProviderRun::failed(provider, e.to_string())
        }
    }
}

async fn answer_questions(
    gateway: &dyn LlmGateway,
    scorer: &VisibilityScorer,
    provider: ProviderKind,
    company: &CompanyProfile,
    questions: &[Question],
) -> Result<ProviderRun, ProviderError> {
    let mut answers = Vec::with_capacity(questions.len());
    let mut scores = Vec::with_capacity(questions.len());

    for question in questions {
        let answer_text = gateway.generate_answer(provider, &question.text).await?;
        let service = attribute_service(company, &question.text, &answer_text);
        let heuristic = heuristic_score(company, &service, &answer_text);
        let outcome = scorer
            .score(provider, company, question, &answer_text, &heuristic)
            .await;

        answers.push(RawAnswer {
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            answer_text,
        });
        scores.push(VisibilityScore {
            provider,
            question_id: question.id.clone(),
            service,
            score: outcome.score,
            rationale: outcome.rationale,
            breakdown: outcome.breakdown,
        });
    }

    Ok(ProviderRun {
        provider,
        answers,
        scores,
        error: None,
    })
}
