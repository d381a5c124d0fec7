//! Gemini `generateContent` client

use super::{AdviceClient, AdviceError};
use crate::config::AiConfig;
use async_trait::async_trait;
use pet_care_shared::conversation::{ChatRole, ChatTurn};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Instruction<'a>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Instruction<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}

/// Client for a Gemini-compatible endpoint
#[derive(Clone, Debug)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_output_tokens: u32,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &AiConfig, api_key: SecretString) -> Result<Self, AdviceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl AdviceClient for GeminiClient {
    async fn advise(&self, preamble: &str, turns: &[ChatTurn]) -> Result<String, AdviceError> {
        let body = GenerateRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "model",
                    },
                    parts: [Part { text: &turn.text }],
                })
                .collect(),
            system_instruction: Instruction {
                parts: [Part { text: preamble }],
            },
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                top_p: 0.95,
                top_k: 40,
            },
        };

        debug!(model = %self.model, turns = turns.len(), "Requesting advice");
        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.expose_secret().as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(256).collect();
            warn!(status = status.as_u16(), body = %snippet, "Adviser returned an error");
            return Err(AdviceError::Unavailable(format!("HTTP {}", status.as_u16())));
        }

        let parsed: GenerateResponse = resp.json().await?;
        parsed
            .into_text()
            .ok_or_else(|| AdviceError::Unavailable("response carried no text".to_string()))
    }
}
