use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use claimpulse_common::{ClaimClassifier, ClaimEnrichment, Config};

use crate::prompt;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

// --- Wire types ---

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

// --- Client ---

/// OpenRouter chat-completions classifier.
pub struct OpenRouterClassifier {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenRouterClassifier {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: OPENROUTER_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.openrouter_api_key, &config.classify_model)
    }

    /// Override the API base URL. Test hook.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn chat(&self, claim_text: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                WireMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT.to_string(),
                },
                WireMessage {
                    role: "user",
                    content: prompt::user_prompt(claim_text),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(model = %request.model, "OpenRouter classification request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("OpenRouter API error ({}): {}", status, error_text));
        }

        let chat_response: ChatResponse = response.json().await?;
        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from OpenRouter"))
    }
}

#[async_trait]
impl ClaimClassifier for OpenRouterClassifier {
    async fn classify(&self, claim_text: &str) -> Result<ClaimEnrichment> {
        let reply = self.chat(claim_text).await?;
        prompt::parse_enrichment(&reply)
    }
}
