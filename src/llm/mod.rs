//! Completion-client abstraction.
//!
//! [`LlmClient`] is an enum over concrete provider implementations. Enum
//! dispatch avoids `dyn` trait objects and the `async-trait` dependency;
//! adding a backend = new module + new variant + new `complete` arm.
//!
//! Provider instances are shared immutable capabilities; clone them freely.

pub mod providers;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

/// All available completion backends.
#[derive(Debug, Clone)]
pub enum LlmClient {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmClient {
    /// Send `prompt` (optionally with a system prompt) and return the text
    /// reply.
    pub async fn complete(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, ProviderError> {
        match self {
            LlmClient::Dummy(p) => p.complete(prompt, system).await,
            LlmClient::OpenAiCompatible(p) => p.complete(prompt, system).await,
        }
    }

    /// Fail-soft surface used by the helpers: provider failures come back as
    /// visible `[ERROR] ...` text instead of an `Err`, so callers never need
    /// retry logic of their own.
    pub async fn complete_soft(&self, prompt: &str, system: Option<&str>) -> String {
        match self.complete(prompt, system).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "completion request failed");
                format!("[ERROR] {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_message() {
        let e = ProviderError::Request("connection refused".into());
        assert!(e.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn dummy_client_completes() {
        let client = LlmClient::Dummy(providers::dummy::DummyProvider);
        let reply = client.complete("hello", None).await.unwrap();
        assert_eq!(reply, "[echo] hello");
    }
}
