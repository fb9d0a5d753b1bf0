//! End-to-end ticket processing.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use triage_common::Result;
use triage_knowledge::{KnowledgeEntry, KnowledgeIndex};
use triage_provider::{build_analyzer, Classification, ProviderGateway};

use crate::config::TriageConfig;

/// Escalation instruction used when no similar issue is known.
const ESCALATION_ACTION: &str = "Ask customer for more logs or escalate to engineering.";

/// Result of triaging one ticket. Derived per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    pub analysis: Classification,
    /// Similar historical issues, best match first.
    pub similar_issues: Vec<KnowledgeEntry>,
    pub suggested_action: String,
    pub known_issue: bool,
}

/// Stateless composition of the provider gateway and the knowledge index.
pub struct TriageService {
    gateway: ProviderGateway,
    index: Arc<KnowledgeIndex>,
    top_k: usize,
}

impl TriageService {
    pub fn new(gateway: ProviderGateway, index: Arc<KnowledgeIndex>, top_k: usize) -> Self {
        Self {
            gateway,
            index,
            top_k,
        }
    }

    /// Build the service from configuration: construct the configured
    /// analyzer and load the knowledge corpus. A corpus that fails to load
    /// is fatal here.
    pub fn from_config(config: &TriageConfig) -> Result<Self> {
        let analyzer = build_analyzer(&config.provider)?;
        let gateway = ProviderGateway::new(
            analyzer,
            config.provider.timeout(),
            config.provider.retry.clone(),
        );
        let index = Arc::new(KnowledgeIndex::from_file(&config.knowledge.path)?);

        info!(
            provider = gateway.provider_name(),
            corpus_entries = index.len(),
            "triage service initialized"
        );

        Ok(Self::new(gateway, index, config.knowledge.top_k))
    }

    /// Name of the configured provider, for health reporting.
    pub fn provider_name(&self) -> &str {
        self.gateway.provider_name()
    }

    /// Process one ticket: classify, retrieve similar issues, compose the
    /// result. Provider failures propagate wrapped; an empty match list is a
    /// valid outcome, not an error.
    pub async fn process(&self, text: &str) -> Result<TriageResult> {
        let started = Instant::now();

        let analysis = self.gateway.analyze(text).await?;

        let query = build_query(&analysis);
        debug!(query = %query, "searching knowledge base");
        let similar_issues = self.index.search(&query, self.top_k);

        let known_issue = !similar_issues.is_empty();
        let suggested_action = if known_issue {
            format!(
                "Attach KB article and respond to user.\nTop match: {}",
                similar_issues[0].title
            )
        } else {
            ESCALATION_ACTION.to_string()
        };

        info!(
            category = %analysis.category,
            severity = ?analysis.severity,
            matches = similar_issues.len(),
            known_issue,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ticket triaged"
        );

        Ok(TriageResult {
            analysis,
            similar_issues,
            suggested_action,
            known_issue,
        })
    }
}

/// Search query: category plus space-joined key entities.
fn build_query(analysis: &Classification) -> String {
    format!("{} {}", analysis.category, analysis.key_entities.join(" "))
}
