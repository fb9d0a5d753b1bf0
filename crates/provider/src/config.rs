//! Provider selection and configuration.
//!
//! Which analyzer backs the gateway is a configuration-time decision: the
//! factory builds exactly one [`TicketAnalyzer`] and the gateway never
//! branches on provider kind at runtime.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use triage_common::{Result, TriageError};

use crate::client::TicketAnalyzer;
use crate::gateway::RetryConfig;
use crate::mock::MockAnalyzer;
use crate::openai::OpenAiAnalyzer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider kind: "mock" or "openai".
    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Endpoint override for OpenAI-compatible servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// If not set, OPENAI_API_KEY from the environment is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Hard timeout applied to each individual attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_kind() -> String {
    "mock".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_timeout_secs() -> f64 {
    8.0
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            model: default_model(),
            api_url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Resolve the API key from config or the OPENAI_API_KEY environment
    /// variable. An empty configured key falls through to the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("OPENAI_API_KEY").ok()
    }
}

/// Build the analyzer named by the settings.
pub fn build_analyzer(settings: &ProviderSettings) -> Result<Arc<dyn TicketAnalyzer>> {
    match settings.kind.as_str() {
        "mock" => Ok(Arc::new(MockAnalyzer::new())),
        "openai" => Ok(Arc::new(OpenAiAnalyzer::new(
            settings.api_url.clone(),
            settings.model.clone(),
            settings.resolve_api_key(),
        ))),
        other => Err(TriageError::Config(format!(
            "unknown provider kind: {other}"
        ))),
    }
}
