//! Customer-question generation with a deterministic template fallback.

use aivis_core::{CompanyProfile, ProviderKind};
use aivis_providers::{LlmGateway, ProviderError};
use thiserror::Error;

use crate::extract::{extract, ExtractError, ExtractMode, ParsedValue};
use crate::heuristic::GENERAL_SERVICE;
use crate::types::{Question, QuestionIntent};
use crate::validate::{validate_questions, ValidationConfig};

/// Intents requested from the model and rotated through by the templates.
/// The validator accepts a wider set.
pub const PROMPT_INTENTS: [QuestionIntent; 5] = [
    QuestionIntent::FindService,
    QuestionIntent::CompareOptions,
    QuestionIntent::Pricing,
    QuestionIntent::Reviews,
    QuestionIntent::Features,
];

#[derive(Debug, Error)]
enum GenerationFailure {
    #[error("provider call failed: {0}")]
    Call(#[from] ProviderError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("no generated question passed validation ({rejected} rejected)")]
    NoneAccepted { rejected: usize },
}

/// Generate up to `count` questions a customer might ask about `company`'s
/// services.
///
/// Uses the first credentialed provider. Falls back to
/// [`template_questions`] when none is credentialed or the model output is
/// unusable. Question ids are `q1..qN` in order.
pub async fn generate_questions(
    gateway: &dyn LlmGateway,
    company: &CompanyProfile,
    count: usize,
) -> Vec<Question> {
    let count = count.max(1);

    let Some(provider) = ProviderKind::ALL
        .into_iter()
        .find(|p| gateway.has_credential(*p))
    else {
        tracing::warn!(
            company = %company.name,
            "no credentialed provider for question generation, using template questions"
        );
        return template_questions(company, count);
    };

    match generate_with(gateway, provider, company, count).await {
        Ok(questions) => {
            tracing::info!(provider = %provider, count = questions.len(), "questions generated");
            questions
        }
        Err(e) => {
            tracing::warn!(
                provider = %provider,
                company = %company.name,
                error = %e,
                "question generation failed, using template questions"
            );
            template_questions(company, count)
        }
    }
}

async fn generate_with(
    gateway: &dyn LlmGateway,
    provider: ProviderKind,
    company: &CompanyProfile,
    count: usize,
) -> Result<Vec<Question>, GenerationFailure> {
    let prompt = build_generation_prompt(company, count);
    let response = gateway.generate_answer(provider, &prompt).await?;

    let candidates = match extract(&response, ExtractMode::QuestionList)? {
        ParsedValue::Records(items) => items,
        ParsedValue::Record(_) => Vec::new(),
    };

    let report = validate_questions(&candidates, &ValidationConfig::default());
    if !report.valid {
        tracing::warn!(
            provider = %provider,
            rejected = report.errors.len(),
            first_issue = %report.errors.first().map(ToString::to_string).unwrap_or_default(),
            "some generated questions were rejected"
        );
    }
    if report.accepted.is_empty() {
        return Err(GenerationFailure::NoneAccepted {
            rejected: report.errors.len(),
        });
    }

    Ok(renumber(report.accepted.into_iter().take(count)))
}

fn renumber(questions: impl Iterator<Item = Question>) -> Vec<Question> {
    questions
        .enumerate()
        .map(|(i, question)| Question {
            id: format!("q{}", i + 1),
            ..question
        })
        .collect()
}

/// Prompt asking for a JSON array of `{text, language, intent}` objects.
#[must_use]
pub fn build_generation_prompt(company: &CompanyProfile, count: usize) -> String {
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
    let intents: Vec<&str> = PROMPT_INTENTS.iter().map(|i| i.as_str()).collect();

    format!(
        "Generate {count} realistic questions that potential customers might ask an AI \
         assistant when looking for the kind of services this company offers.\n\n\
         Company: {name}\n\
         Description: {description}\n\
         Services: {services}\n\
         Languages: {languages}\n\n\
         Rules:\n\
         - Write each question in one of the listed languages, spread across them.\n\
         - Most questions should not name the company; ask the way a customer who does not know it yet would.\n\
         - Each question must be between 10 and 200 characters.\n\
         - Use only these intents: {intents}.\n\n\
         Respond with ONLY a JSON array of objects with the keys \"text\", \"language\" \
         (two-letter code) and \"intent\".",
        name = company.name,
        languages = company.locales().join(", "),
        intents = intents.join(", "),
    )
}

fn template_text(intent: QuestionIntent, service: &str) -> String {
    match intent {
        QuestionIntent::CompareOptions => {
            format!("What are the best {service} providers and how do they compare?")
        }
        QuestionIntent::Pricing => format!("How much does {service} typically cost?"),
        QuestionIntent::Reviews => {
            format!("Which {service} providers have the best customer reviews?")
        }
        QuestionIntent::Features => {
            format!("What features should I look for in a {service} provider?")
        }
        QuestionIntent::EvaluateCompany => {
            format!("Is a specialist {service} company worth hiring?")
        }
        QuestionIntent::Alternatives => {
            format!("What are good alternatives for {service}?")
        }
        QuestionIntent::FindService => format!("Which companies provide {service} services?"),
    }
}

/// Deterministic questions: one per (service, locale) pair, intents rotating
/// through [`PROMPT_INTENTS`], at most `count`.
#[must_use]
pub fn template_questions(company: &CompanyProfile, count: usize) -> Vec<Question> {
    let services: Vec<&str> = if company.services.is_empty() {
        vec![GENERAL_SERVICE]
    } else {
        company.services.iter().map(String::as_str).collect()
    };
    let locales = company.locales();

    services
        .iter()
        .flat_map(|service| locales.iter().map(move |locale| (*service, locale)))
        .take(count)
        .enumerate()
        .map(|(i, (service, locale))| {
            let intent = PROMPT_INTENTS[i % PROMPT_INTENTS.len()];
            Question {
                id: format!("q{}", i + 1),
                text: template_text(intent, service),
                language: locale.clone(),
                intent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{acme, ScriptedGateway};

    fn multi_service() -> CompanyProfile {
        CompanyProfile {
            services: vec!["backup".to_string(), "hosting".to_string()],
            target_locales: vec!["en".to_string(), "de".to_string()],
            ..acme()
        }
    }

    #[test]
    fn templates_cover_service_locale_pairs_with_rotating_intents() {
        let questions = template_questions(&multi_service(), 10);
        assert_eq!(questions.len(), 4);
        let pairs: Vec<(&str, QuestionIntent)> = questions
            .iter()
            .map(|q| (q.language.as_str(), q.intent))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("en", QuestionIntent::FindService),
                ("de", QuestionIntent::CompareOptions),
                ("en", QuestionIntent::Pricing),
                ("de", QuestionIntent::Reviews),
            ]
        );
        assert!(questions[2].text.contains("hosting"));
        assert_eq!(questions[3].id, "q4");
    }

    #[test]
    fn templates_are_capped_and_valid() {
        let questions = template_questions(&multi_service(), 3);
        assert_eq!(questions.len(), 3);
        let as_json: Vec<serde_json::Value> = questions
            .iter()
            .map(|q| serde_json::to_value(q).unwrap())
            .collect();
        assert!(validate_questions(&as_json, &ValidationConfig::default()).valid);
    }

    #[test]
    fn templates_without_services_use_general() {
        let mut company = acme();
        company.services.clear();
        let questions = template_questions(&company, 5);
        assert_eq!(questions.len(), 1);
        assert!(questions[0].text.contains(GENERAL_SERVICE));
    }

    #[test]
    fn prompt_lists_company_and_requested_intents_only() {
        let prompt = build_generation_prompt(&multi_service(), 5);
        assert!(prompt.contains("Acme Cloud"));
        assert!(prompt.contains("backup, hosting"));
        assert!(prompt.contains("en, de"));
        assert!(prompt.contains("find_service"));
        assert!(!prompt.contains("evaluate_company"));
    }

    #[tokio::test]
    async fn model_questions_are_validated_capped_and_renumbered() {
        let gateway = Arc::new(ScriptedGateway::credentialed(&[ProviderKind::Gemini], |_, _| {
            Ok(r#"Here you go:
```json
[
  {"id": "x", "text": "Which companies offer cloud backup?", "language": "en", "intent": "find_service"},
  {"text": "short", "language": "en", "intent": "pricing"},
  {"text": "How much does offsite backup cost?", "language": "EN", "intent": "pricing"},
  {"text": "Who has the best backup reviews?", "language": "en", "intent": "reviews"}
]
```"#
                .to_string())
        }));

        let questions = generate_questions(gateway.as_ref(), &acme(), 2).await;
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "q1");
        assert_eq!(questions[0].text, "Which companies offer cloud backup?");
        assert_eq!(questions[1].id, "q2");
        assert_eq!(questions[1].language, "en");
        assert_eq!(gateway.calls()[0].0, ProviderKind::Gemini);
    }

    #[tokio::test]
    async fn no_credentials_uses_templates_without_calls() {
        let gateway = ScriptedGateway::credentialed(&[], |_, _| Ok(String::new()));
        let questions = generate_questions(&gateway, &acme(), 5).await;
        assert_eq!(questions, template_questions(&acme(), 5));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn unusable_output_uses_templates() {
        let gateway = ScriptedGateway::credentialed(&[ProviderKind::OpenAi], |_, _| {
            Ok(r#"[{"text": "bad", "language": "english", "intent": "x"}]"#.to_string())
        });
        let questions = generate_questions(&gateway, &acme(), 5).await;
        assert_eq!(questions, template_questions(&acme(), 5));
    }

    #[tokio::test]
    async fn call_error_uses_templates() {
        let gateway = ScriptedGateway::credentialed(&[ProviderKind::Anthropic], |p, _| {
            Err(ProviderError::RateLimited { provider: p })
        });
        let questions = generate_questions(&gateway, &acme(), 5).await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].intent, QuestionIntent::FindService);
    }
}
