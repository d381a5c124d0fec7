//! Remote pet-care adviser
//!
//! The assistant forwards conversations through [`AdviceClient`]. Any
//! error is answered locally, so the error type carries a reason only.

mod gemini;

pub use gemini::GeminiClient;

use crate::config::AiConfig;
use async_trait::async_trait;
use pet_care_shared::conversation::ChatTurn;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdviceError {
    #[error("adviser unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for AdviceError {
    fn from(err: reqwest::Error) -> Self {
        AdviceError::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait AdviceClient: Send + Sync + 'static {
    /// Answer the last user turn given the preamble and prior turns
    async fn advise(&self, preamble: &str, turns: &[ChatTurn]) -> Result<String, AdviceError>;
}

/// Adviser used when the remote one is disabled or has no key
#[derive(Debug, Clone)]
pub struct OfflineAdviser {
    reason: String,
}

impl OfflineAdviser {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl AdviceClient for OfflineAdviser {
    async fn advise(&self, _preamble: &str, _turns: &[ChatTurn]) -> Result<String, AdviceError> {
        Err(AdviceError::Unavailable(self.reason.clone()))
    }
}

/// Build the adviser described by the configuration
pub fn from_config(config: &AiConfig) -> Result<Arc<dyn AdviceClient>, AdviceError> {
    if !config.enabled {
        info!("Assistant adviser disabled; using local replies");
        return Ok(Arc::new(OfflineAdviser::new("adviser disabled")));
    }

    match &config.api_key {
        Some(key) => {
            info!(model = %config.model, "Assistant adviser enabled");
            Ok(Arc::new(GeminiClient::new(config, key.clone())?))
        }
        None => {
            info!("No adviser API key configured; using local replies");
            Ok(Arc::new(OfflineAdviser::new("no API key configured")))
        }
    }
}
