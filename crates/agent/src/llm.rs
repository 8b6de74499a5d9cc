use anyhow::Result;
use async_trait::async_trait;

/// Text-completion collaborator. Implementations return the raw model text;
/// decoding and fallback handling happen in the policy step.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn model_id(&self) -> &str {
        "unknown"
    }
}
