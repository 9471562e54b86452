use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::error::FraudLensError;

/// Seam for the chat-completion service so handlers can be tested with stubs.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one system + user exchange and return the assistant's text reply.
    async fn complete(&self, system: &str, user: &str) -> Result<String, FraudLensError>;
}

// ---------------------------------------------------------------------------
// OpenAI-compatible provider  (SiliconFlow, OpenAI, DeepSeek, Groq …)
// ---------------------------------------------------------------------------

pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f64,
    chat_url: String,
}

impl OpenAiProvider {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        OpenAiProvider {
            http,
            api_key: config.api_key.clone(),
            model: config.chat_model.clone(),
            temperature: config.temperature,
            chat_url: config.chat_url(),
        }
    }
}

// --- OpenAI response types ---

#[derive(Debug, Deserialize)]
struct OaiResponse {
    choices: Vec<OaiChoice>,
}

#[derive(Debug, Deserialize)]
struct OaiChoice {
    message: OaiMessage,
}

#[derive(Debug, Deserialize)]
struct OaiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OaiErrorResponse {
    error: OaiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OaiErrorDetail {
    message: String,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, FraudLensError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "response_format": {"type": "json_object"},
            "temperature": self.temperature,
        });

        let mut req = self
            .http
            .post(&self.chat_url)
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.trim().is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<OaiErrorResponse>(&text) {
                return Err(FraudLensError::LlmApi(err.error.message));
            }
            return Err(FraudLensError::LlmApi(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;
        let oai: OaiResponse = serde_json::from_str(&text).map_err(|e| {
            FraudLensError::LlmApi(format!("Failed to parse chat response: {e}\nBody: {text}"))
        })?;

        oai.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| FraudLensError::LlmApi("chat response contained no choices".into()))
    }
}
