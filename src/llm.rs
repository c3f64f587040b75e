use crate::config::{LlmConfig, LlmProvider};
use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Text completion backend used by the agent.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String>;

    fn provider(&self) -> LlmProvider;

    fn model(&self) -> &str;
}

/// HTTP client for Ollama's `/api/generate` and Gemini's `generateContent`.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    provider: LlmProvider,
    base_url: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let (base_url, api_key) = match config.provider {
            LlmProvider::Ollama => (
                config.ollama_host.trim_end_matches('/').to_string(),
                String::new(),
            ),
            LlmProvider::Gemini => {
                if config.gemini_api_key.is_empty() {
                    return Err(AssistantError::Config("GEMINI_API_KEY is not set".to_string()));
                }
                (GEMINI_BASE_URL.to_string(), config.gemini_api_key.clone())
            }
        };

        Ok(Self {
            http,
            provider: config.provider,
            base_url,
            model: config.model().to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call_ollama(&self, prompt: &str, temperature: f32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": temperature }
        });

        let response_json = self
            .post_json_with_key(&format!("{}/api/generate", self.base_url), &body, None)
            .await?;

        let content = response_json["response"]
            .as_str()
            .ok_or_else(|| AssistantError::Llm("No response field in Ollama reply".to_string()))?;
        Ok(content.trim().to_string())
    }

    async fn call_gemini(&self, prompt: &str, temperature: f32) -> Result<String> {
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": temperature }
        });
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response_json = self
            .post_json_with_key(&url, &body, Some(&self.api_key))
            .await?;

        let content = response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| AssistantError::Llm("No content in Gemini response".to_string()))?;
        Ok(content.trim().to_string())
    }

    async fn post_json_with_key(
        &self,
        url: &str,
        body: &serde_json::Value,
        api_key: Option<&str>,
    ) -> Result<serde_json::Value> {
        let mut request = self
            .http
            .post(url)
            .header("Content-Type", "application/json");
        if let Some(key) = api_key {
            request = request.header("x-goog-api-key", key);
        }
        let response = request
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::Llm(format!(
                "LLM API returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| {
                AssistantError::Llm(format!("Failed to parse LLM response: {}", e.without_url()))
            })
    }
}

/// Errors are logged, so the request URL is stripped from them.
fn classify_transport_error(err: reqwest::Error) -> AssistantError {
    let err = err.without_url();
    if err.is_connect() || err.is_timeout() {
        AssistantError::Connectivity(format!("LLM API call failed: {}", err))
    } else {
        AssistantError::Llm(format!("LLM API call failed: {}", err))
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        debug!(
            provider = ?self.provider,
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "Calling LLM"
        );
        match self.provider {
            LlmProvider::Ollama => self.call_ollama(prompt, temperature).await,
            LlmProvider::Gemini => self.call_gemini(prompt, temperature).await,
        }
    }

    fn provider(&self) -> LlmProvider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }
}
