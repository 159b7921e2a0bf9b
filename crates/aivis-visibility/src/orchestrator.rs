//! Decide, per answer, between LLM structured scoring and the heuristic.
//!
//! Every failure on the LLM path (no credentialed provider, call error,
//! unparseable output) lands on the heuristic score, as does a mock answer.
//! Nothing here returns an error to the caller.

use std::sync::Arc;

use aivis_core::{CompanyProfile, ProviderKind, ScoringSettings};
use aivis_providers::{is_mock_response, LlmGateway};
use serde_json::Value;

use crate::calculator::calculate;
use crate::extract::{extract, ExtractMode, ParsedValue};
use crate::normalize::normalize_breakdown;
use crate::types::{HeuristicScore, Question, ScoreOutcome, ScoringWeights};

pub struct VisibilityScorer {
    gateway: Arc<dyn LlmGateway>,
    settings: ScoringSettings,
    requested_provider: Option<ProviderKind>,
    weights: ScoringWeights,
}

impl VisibilityScorer {
    /// Build a scorer. The configured weight override is parsed once here.
    #[must_use]
    pub fn new(gateway: Arc<dyn LlmGateway>, settings: ScoringSettings) -> Self {
        let weights = resolve_weights(None, settings.weights_json.as_deref());
        Self {
            gateway,
            settings,
            requested_provider: None,
            weights,
        }
    }

    /// Ask for a specific scoring provider. Ignored if it has no credential.
    #[must_use]
    pub fn with_requested_provider(mut self, provider: ProviderKind) -> Self {
        self.requested_provider = Some(provider);
        self
    }

    /// Override the configured weights.
    #[must_use]
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = resolve_weights(Some(weights), self.settings.weights_json.as_deref());
        self
    }

    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scoring providers in precedence order, before credential checks:
    /// requested, configured default, the answer's origin, then the fixed
    /// preference order.
    #[must_use]
    pub fn provider_candidates(&self, origin: ProviderKind) -> Vec<ProviderKind> {
        [
            self.requested_provider,
            self.settings.preferred_provider,
            Some(origin),
        ]
        .into_iter()
        .flatten()
        .chain(ProviderKind::ALL)
        .collect()
    }

    /// First credentialed candidate from [`Self::provider_candidates`].
    #[must_use]
    pub fn select_provider(&self, origin: ProviderKind) -> Option<ProviderKind> {
        self.provider_candidates(origin)
            .into_iter()
            .find(|p| self.gateway.has_credential(*p))
    }

    /// Score one answer.
    ///
    /// Returns the heuristic unchanged when scoring is disabled, the answer is
    /// a mock placeholder, no provider is credentialed, or the LLM path fails
    /// for any reason.
    pub async fn score(
        &self,
        origin: ProviderKind,
        company: &CompanyProfile,
        question: &Question,
        answer_text: &str,
        heuristic: &HeuristicScore,
    ) -> ScoreOutcome {
        if !self.settings.enabled {
            return ScoreOutcome::from_heuristic(heuristic);
        }

        if is_mock_response(answer_text) {
            tracing::debug!(
                origin = %origin,
                question_id = %question.id,
                "answer is a mock placeholder, using heuristic score"
            );
            return ScoreOutcome::from_heuristic(heuristic);
        }

        let Some(scorer) = self.select_provider(origin) else {
            tracing::debug!(
                origin = %origin,
                "no credentialed scoring provider, using heuristic score"
            );
            return ScoreOutcome::from_heuristic(heuristic);
        };

        let prompt = build_scoring_prompt(company, question, answer_text);
        let response = match self.gateway.generate_answer(scorer, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    provider = %scorer,
                    question_id = %question.id,
                    error = %e,
                    "scoring call failed, using heuristic score"
                );
                return ScoreOutcome::from_heuristic(heuristic);
            }
        };

        let record = match extract(&response, ExtractMode::ScoringRecord).map(ParsedValue::into_record) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(
                    provider = %scorer,
                    question_id = %question.id,
                    "scoring response was not a single record, using heuristic score"
                );
                return ScoreOutcome::from_heuristic(heuristic);
            }
            Err(e) => {
                tracing::warn!(
                    provider = %scorer,
                    question_id = %question.id,
                    error = %e,
                    "could not parse scoring response, using heuristic score"
                );
                return ScoreOutcome::from_heuristic(heuristic);
            }
        };

        let breakdown = normalize_breakdown(&Value::Object(record));
        let score = calculate(&breakdown, Some(&self.weights));
        let rationale = if breakdown.rationale.trim().is_empty() {
            heuristic.rationale.clone()
        } else {
            breakdown.rationale.clone()
        };

        ScoreOutcome {
            score,
            breakdown: Some(breakdown),
            rationale,
        }
    }
}

/// Pick the weights to score with: explicit override, then the configured
/// JSON if it parses, then the defaults.
#[must_use]
pub fn resolve_weights(explicit: Option<ScoringWeights>, configured_json: Option<&str>) -> ScoringWeights {
    let configured = configured_json.and_then(|raw| {
        serde_json::from_str::<ScoringWeights>(raw)
            .inspect_err(|e| {
                tracing::warn!(error = %e, "ignoring malformed scoring weights override");
            })
            .ok()
    });

    [explicit, configured]
        .into_iter()
        .flatten()
        .next()
        .unwrap_or_default()
}

fn build_scoring_prompt(company: &CompanyProfile, question: &Question, answer_text: &str) -> String {
    let description = if company.description.is_empty() {
        "(none provided)"
    } else {
        company.description.as_str()
    };
    let services = if company.services.is_empty() {
        "(none listed)".to_string()
    } else {
        company.services.join(", ")
    };

    format!(
        "You are auditing how visible a company is in an AI assistant's answer.\n\n\
         Company: {name}\n\
         Description: {description}\n\
         Services: {services}\n\n\
         Question asked: {question}\n\n\
         Answer given:\n\"\"\"\n{answer_text}\n\"\"\"\n\n\
         Rate the answer. Respond with ONLY a JSON object with these keys:\n\
         - mentionPresence: 1 if {name} is named, otherwise 0\n\
         - mentionContext: 0 to 1, how favourable and specific the mention is\n\
         - mentionPosition: 0 to 1, 1 if {name} is named first, lower the later it appears\n\
         - descriptionDetail: 0 to 1, how accurately the offering is described\n\
         - answerRelevance: 0 to 1, how well the answer addresses the question\n\
         - serviceMatch: 0 to 1, how well {name}'s services fit what was asked\n\
         - mentionCount: how many times {name} is named\n\
         - rationale: one or two sentences explaining the rating",
        name = company.name,
        question = question.text,
    )
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use aivis_providers::{mock_response, ProviderError};

    use super::*;
    use crate::heuristic::heuristic_score;
    use crate::testing::{acme, question, ScriptedGateway};

    fn settings() -> ScoringSettings {
        ScoringSettings::default()
    }

    fn heuristic() -> HeuristicScore {
        heuristic_score(
            &acme(),
            "backup",
            "You could consider Acme Cloud or Rival Inc for backup.",
        )
    }

    #[tokio::test]
    async fn disabled_scoring_returns_heuristic_without_calls() {
        let gateway = Arc::new(ScriptedGateway::credentialed(&ProviderKind::ALL, |_, _| {
            Ok(r#"{"mentionPresence": 0}"#.to_string())
        }));
        let scorer = VisibilityScorer::new(
            gateway.clone(),
            ScoringSettings {
                enabled: false,
                ..settings()
            },
        );

        let outcome = scorer
            .score(ProviderKind::OpenAi, &acme(), &question(), "answer", &heuristic())
            .await;
        assert_eq!(outcome.score, 0.9);
        assert!(outcome.breakdown.is_none());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn mock_answer_is_never_sent_to_a_scorer() {
        let gateway = Arc::new(ScriptedGateway::credentialed(&[ProviderKind::Anthropic], |_, _| {
            Ok(r#"{"mentionPresence": 1, "rationale": "placeholder"}"#.to_string())
        }));
        let scorer = VisibilityScorer::new(gateway.clone(), settings());
        let answer = mock_response(ProviderKind::OpenAi);
        let h = heuristic_score(&acme(), "backup", &answer);

        let outcome = scorer
            .score(ProviderKind::OpenAi, &acme(), &question(), &answer, &h)
            .await;

        assert!(gateway.calls().is_empty());
        assert!(outcome.breakdown.is_none());
        assert_eq!(outcome, ScoreOutcome::from_heuristic(&h));
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn provider_precedence_is_requested_configured_origin_then_fixed() {
        let gateway = Arc::new(ScriptedGateway::credentialed(&[], |_, _| Ok(String::new())));
        let scorer = VisibilityScorer::new(
            gateway,
            ScoringSettings {
                preferred_provider: Some(ProviderKind::Gemini),
                ..settings()
            },
        )
        .with_requested_provider(ProviderKind::Anthropic);

        assert_eq!(
            scorer.provider_candidates(ProviderKind::OpenAi),
            vec![
                ProviderKind::Anthropic,
                ProviderKind::Gemini,
                ProviderKind::OpenAi,
                ProviderKind::OpenAi,
                ProviderKind::Anthropic,
                ProviderKind::Gemini,
            ]
        );
    }

    #[test]
    fn uncredentialed_candidates_are_skipped() {
        let gateway = Arc::new(ScriptedGateway::credentialed(
            &[ProviderKind::Gemini, ProviderKind::Anthropic],
            |_, _| Ok(String::new()),
        ));
        let scorer = VisibilityScorer::new(
            gateway.clone(),
            ScoringSettings {
                preferred_provider: Some(ProviderKind::OpenAi),
                ..settings()
            },
        );
        // Configured default lacks a key, so the origin wins.
        assert_eq!(scorer.select_provider(ProviderKind::Gemini), Some(ProviderKind::Gemini));

        let no_keys = VisibilityScorer::new(
            Arc::new(ScriptedGateway::credentialed(&[], |_, _| Ok(String::new()))),
            settings(),
        );
        assert_eq!(no_keys.select_provider(ProviderKind::OpenAi), None);

        // Origin not credentialed either: first in fixed order.
        let fixed = VisibilityScorer::new(gateway, settings());
        assert_eq!(fixed.select_provider(ProviderKind::OpenAi), Some(ProviderKind::Anthropic));
    }

    #[test]
    fn weights_precedence_is_explicit_configured_default() {
        let configured = r#"{"mentionPresence": 1, "mentionContext": 0}"#;
        let explicit = ScoringWeights {
            service_match: 5.0,
            ..ScoringWeights::default()
        };
        assert_eq!(resolve_weights(Some(explicit), Some(configured)), explicit);

        let from_config = resolve_weights(None, Some(configured));
        assert_eq!(from_config.mention_presence, 1.0);
        assert_eq!(from_config.mention_context, 0.0);

        assert_eq!(resolve_weights(None, Some("{not json")), ScoringWeights::default());
        assert_eq!(resolve_weights(None, None), ScoringWeights::default());
    }

    #[tokio::test]
    async fn llm_breakdown_is_scored_with_weights() {
        let gateway = Arc::new(ScriptedGateway::credentialed(&[ProviderKind::Anthropic], |_, _| {
            Ok("```json\n{\"mentionPresence\": 1, \"mentionContext\": 1, \"mentionPosition\": 1, \
                \"descriptionDetail\": 1, \"answerRelevance\": 1, \"serviceMatch\": 1, \
                \"mentionCount\": 2, \"rationale\": \"Named first with detail.\"}\n```"
                .to_string())
        }));
        let scorer = VisibilityScorer::new(gateway.clone(), settings());

        let outcome = scorer
            .score(ProviderKind::OpenAi, &acme(), &question(), "answer", &heuristic())
            .await;

        assert!((outcome.score - 1.0).abs() < 1e-12);
        assert_eq!(outcome.rationale, "Named first with detail.");
        assert_eq!(outcome.breakdown.map(|b| b.mention_count), Some(2));

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ProviderKind::Anthropic);
        assert!(calls[0].1.contains("Acme Cloud"));
        assert!(calls[0].1.contains("Which companies provide backup in my region?"));
    }

    #[tokio::test]
    async fn empty_llm_rationale_falls_back_to_heuristic_rationale() {
        let gateway = Arc::new(ScriptedGateway::credentialed(&[ProviderKind::OpenAi], |_, _| {
            Ok(r#"{"mentionPresence": 0, "rationale": "  "}"#.to_string())
        }));
        let scorer = VisibilityScorer::new(gateway, settings());
        let h = heuristic();

        let outcome = scorer
            .score(ProviderKind::OpenAi, &acme(), &question(), "answer", &h)
            .await;
        assert_eq!(outcome.rationale, h.rationale);
        assert_eq!(outcome.score, 0.0);
    }

    #[tokio::test]
    async fn call_failure_falls_back_to_heuristic() {
        let gateway = Arc::new(ScriptedGateway::credentialed(&[ProviderKind::OpenAi], |p, _| {
            Err(ProviderError::UnexpectedStatus {
                provider: p,
                status: 500,
            })
        }));
        let scorer = VisibilityScorer::new(gateway, settings());

        let outcome = scorer
            .score(ProviderKind::OpenAi, &acme(), &question(), "answer", &heuristic())
            .await;
        assert_eq!(outcome, ScoreOutcome::from_heuristic(&heuristic()));
    }

    #[tokio::test]
    async fn unparseable_output_falls_back_to_heuristic() {
        let gateway = Arc::new(ScriptedGateway::credentialed(&[ProviderKind::OpenAi], |_, _| {
            Ok("I would rate this answer highly.".to_string())
        }));
        let scorer = VisibilityScorer::new(gateway, settings());

        let outcome = scorer
            .score(ProviderKind::OpenAi, &acme(), &question(), "answer", &heuristic())
            .await;
        assert_eq!(outcome.score, 0.9);
        assert!(outcome.breakdown.is_none());
    }
}
