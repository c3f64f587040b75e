//! Runtime configuration
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file). `from_lookup` takes any key lookup so tests never touch the real
//! environment.

use crate::error::{AssistantError, Result};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Ollama,
    Gemini,
}

impl FromStr for LlmProvider {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "gemini" => Ok(LlmProvider::Gemini),
            other => Err(AssistantError::Config(format!("Invalid LLM_PROVIDER: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub ollama_host: String,
    pub ollama_model: String,
    pub ollama_temperature: f32,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_temperature: f32,
}

impl LlmConfig {
    pub fn model(&self) -> &str {
        match self.provider {
            LlmProvider::Ollama => &self.ollama_model,
            LlmProvider::Gemini => &self.gemini_model,
        }
    }

    pub fn temperature(&self) -> f32 {
        match self.provider {
            LlmProvider::Ollama => self.ollama_temperature,
            LlmProvider::Gemini => self.gemini_temperature,
        }
    }
}

/// Knobs for a single question's pipeline.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub timeout: Duration,
    pub result_preview_chars: usize,
    pub top_k: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            result_preview_chars: 4000,
            top_k: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub agent: AgentSettings,
}

impl AppConfig {
    /// Load from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database = DatabaseConfig {
            host: get("MYSQL_HOST", "127.0.0.1"),
            port: parse_var(&lookup, "MYSQL_PORT", 3306)?,
            user: get("MYSQL_USER", "user"),
            password: get("MYSQL_PASS", "user"),
            database: get("MYSQL_DB", "automotive"),
        };

        let mut provider: LlmProvider = get("LLM_PROVIDER", "ollama").parse()?;
        let gemini_api_key = get("GEMINI_API_KEY", "");
        if provider == LlmProvider::Gemini && gemini_api_key.is_empty() {
            warn!("GEMINI_API_KEY is empty but LLM_PROVIDER is gemini, falling back to ollama");
            provider = LlmProvider::Ollama;
        }

        let llm = LlmConfig {
            provider,
            ollama_host: get("OLLAMA_HOST", "http://127.0.0.1:11434"),
            ollama_model: get("OLLAMA_MODEL", "gemma3:4b"),
            ollama_temperature: parse_var(&lookup, "OLLAMA_TEMPERATURE", 0.5)?,
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL", "gemini-1.5-flash"),
            gemini_temperature: parse_var(&lookup, "GEMINI_TEMPERATURE", 0.3)?,
        };

        let agent = AgentSettings {
            timeout: Duration::from_secs(parse_var(&lookup, "ASSISTANT_TIMEOUT_SECS", 120u64)?),
            result_preview_chars: parse_var(&lookup, "ASSISTANT_RESULT_PREVIEW", 4000usize)?,
            top_k: parse_var(&lookup, "ASSISTANT_TOP_K", 5usize)?,
        };

        Ok(Self { database, llm, agent })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AssistantError::Config(format!("{} has an invalid value: {}", key, raw))),
    }
}
