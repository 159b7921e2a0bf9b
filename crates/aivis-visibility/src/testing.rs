//! Test doubles shared by unit tests.

use std::sync::Mutex;

use aivis_core::{CompanyProfile, ProviderKind};
use aivis_providers::{mock_response, LlmGateway, ProviderError};
use async_trait::async_trait;

use crate::types::{Question, QuestionIntent};

type Responder = dyn Fn(ProviderKind, &str) -> Result<String, ProviderError> + Send + Sync;

/// Gateway whose credentialed providers answer through a closure and whose
/// other providers return the mock sentinel. Every call is recorded.
pub(crate) struct ScriptedGateway {
    credentialed: Vec<ProviderKind>,
    respond: Box<Responder>,
    calls: Mutex<Vec<(ProviderKind, String)>>,
}

impl ScriptedGateway {
    pub(crate) fn credentialed<F>(providers: &[ProviderKind], respond: F) -> Self
    where
        F: Fn(ProviderKind, &str) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            credentialed: providers.to_vec(),
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(ProviderKind, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    fn has_credential(&self, provider: ProviderKind) -> bool {
        self.credentialed.contains(&provider)
    }

    async fn generate_answer(
        &self,
        provider: ProviderKind,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((provider, prompt.to_string()));
        if !self.has_credential(provider) {
            return Ok(mock_response(provider));
        }
        (self.respond)(provider, prompt)
    }
}

pub(crate) fn acme() -> CompanyProfile {
    CompanyProfile {
        name: "Acme Cloud".to_string(),
        description: "Managed cloud services for small businesses".to_string(),
        services: vec!["backup".to_string()],
        website: None,
        target_locales: vec![],
    }
}

pub(crate) fn question() -> Question {
    Question {
        id: "q1".to_string(),
        text: "Which companies provide backup in my region?".to_string(),
        language: "en".to_string(),
        intent: QuestionIntent::FindService,
    }
}
