//! Service configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;
use triage_common::{Result, TriageError};
use triage_provider::ProviderSettings;

/// Main service configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub knowledge: KnowledgeSettings,

    #[serde(default)]
    pub limits: LimitSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    /// Path to the JSON corpus of known issues.
    #[serde(default = "default_kb_path")]
    pub path: String,

    /// Number of similar issues returned per ticket.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_kb_path() -> String {
    "data/kb.json".into()
}

fn default_top_k() -> usize {
    3
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            path: default_kb_path(),
            top_k: default_top_k(),
        }
    }
}

/// Admission control limits for the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitSettings {
    /// Maximum admitted requests per client within the window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Trailing window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_requests() -> u32 {
    20
}

fn default_window_secs() -> u64 {
    60
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl TriageConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TriageError::Config(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            TriageError::Config(format!("failed to parse config '{}': {e}", path.display()))
        })?;

        if config.provider.api_key.is_some() {
            warn!(
                "API key found in config file '{}'. Prefer the OPENAI_API_KEY \
                 environment variable.",
                path.display()
            );
        }

        Ok(config)
    }
}
