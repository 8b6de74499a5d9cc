//! Ollama completion client using the `/api/generate` API.

use std::time::Duration;

use agenda_agent::llm::LlmClient;
use agenda_core::config::LlmConfig;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("ollama request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("ollama returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    /// Keep the model resident between turns.
    pub keep_alive: i64,
    pub options: GenerateOptions,
}

#[derive(Debug, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub num_predict: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, OllamaError> {
        let client =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    pub fn build_request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            keep_alive: -1,
            options: GenerateOptions { temperature: self.temperature, num_predict: self.max_tokens },
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<GenerateResponse, OllamaError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url).json(&self.build_request(prompt)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OllamaError::HttpStatus { status: status.as_u16(), body });
        }
        Ok(response.json().await?)
    }

    /// Names of locally available models.
    pub async fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OllamaError::HttpStatus { status: status.as_u16(), body });
        }
        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|model| model.name).collect())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let generated = self
            .generate(prompt)
            .await
            .with_context(|| format!("completion with model `{}` failed", self.model))?;
        debug!(
            event_name = "adapters.ollama.completed",
            model = %self.model,
            eval_count = generated.eval_count,
        );
        Ok(generated.response.trim().to_string())
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use agenda_core::config::{LlmConfig, LlmProvider};

    use super::{GenerateResponse, OllamaClient};

    fn config() -> LlmConfig {
        LlmConfig {
            provider: LlmProvider::Ollama,
            base_url: "http://127.0.0.1:11434/".to_string(),
            model: "phi3:mini".to_string(),
            timeout_secs: 30,
            temperature: 0.2,
            max_tokens: 160,
        }
    }

    #[test]
    fn request_disables_streaming_and_carries_options() {
        let client = OllamaClient::from_config(&config()).expect("client");
        let json = serde_json::to_value(client.build_request("hello")).expect("serialize");

        assert_eq!(json["model"], "phi3:mini");
        assert_eq!(json["prompt"], "hello");
        assert_eq!(json["stream"], false);
        assert_eq!(json["keep_alive"], -1);
        assert_eq!(json["options"]["num_predict"], 160);
        assert!((json["options"]["temperature"].as_f64().expect("f64") - 0.2).abs() < 1e-6);
    }

    #[test]
    fn response_text_is_read_from_response_field() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"model":"phi3:mini","response":"{\"action\":\"ask\"}","done":true,"eval_count":12}"#,
        )
        .expect("parse");
        assert_eq!(parsed.response, "{\"action\":\"ask\"}");
        assert_eq!(parsed.eval_count, Some(12));
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = OllamaClient::from_config(&config()).expect("client");
        assert_eq!(client.base_url, "http://127.0.0.1:11434");
    }
}
