//! Deterministic rule-based analyzer.
//!
//! Stands in for a remote model backend in development and tests. The rules
//! mirror what a first-pass keyword classifier would do: pick a category and
//! severity from indicative phrases, and surface the longest words as key
//! entities.

use async_trait::async_trait;
use serde_json::json;
use triage_common::Result;

use crate::client::TicketAnalyzer;

/// Maximum length of the echoed summary.
const MAX_SUMMARY_LEN: usize = 200;

/// Maximum number of extracted key entities.
const MAX_KEY_ENTITIES: usize = 3;

#[derive(Debug, Default)]
pub struct MockAnalyzer;

impl MockAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn categorize(text: &str) -> &'static str {
        if text.contains("vpn") || text.contains("error 800") {
            "Network"
        } else if text.contains("payment") || text.contains("billing") || text.contains("charge") {
            "Billing"
        } else if text.contains("login") || text.contains("mfa") {
            "Login"
        } else if text.contains("slow") || text.contains("latency") || text.contains("delay") {
            "Performance"
        } else {
            "Bug"
        }
    }

    fn grade_severity(text: &str) -> &'static str {
        if ["crash", "down", "outage"].iter().any(|k| text.contains(k)) {
            "Critical"
        } else if ["cannot", "can't", "not working", "error"]
            .iter()
            .any(|k| text.contains(k))
        {
            "High"
        } else if text.contains("slow") {
            "Medium"
        } else {
            "Low"
        }
    }

    /// Pick up to three words longer than four characters as key entities.
    fn extract_entities(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c| c == '.' || c == ','))
            .filter(|w| w.len() > 4)
            .take(MAX_KEY_ENTITIES)
            .map(String::from)
            .collect()
    }
}

#[async_trait]
impl TicketAnalyzer for MockAnalyzer {
    async fn analyze(&self, text: &str) -> Result<serde_json::Value> {
        let lower = text.to_lowercase();

        let category = Self::categorize(&lower);
        let severity = Self::grade_severity(&lower);
        let key_entities = Self::extract_entities(&lower);

        let summary: String = text.trim().chars().take(MAX_SUMMARY_LEN).collect();

        Ok(json!({
            "summary": summary,
            "category": category,
            "severity": severity,
            "key_entities": key_entities,
            "reasoning": format!("Detected category '{}' from words {:?}", category, key_entities),
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
