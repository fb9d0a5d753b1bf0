use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use triage_common::Result;

/// Ticket severity, as judged by the classification provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Structured classification of one support ticket.
///
/// Produced once per request by the gateway and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub summary: String,
    pub category: String,
    pub severity: Severity,
    pub key_entities: Vec<String>,
    pub reasoning: String,
}

/// One opaque async classification capability.
///
/// Implementations return raw structured data; shape validation against
/// [`Classification`] is the gateway's job, so that a schema violation can be
/// distinguished from a transient transport failure.
#[async_trait]
pub trait TicketAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<serde_json::Value>;
    fn name(&self) -> &str;
}

#[async_trait]
impl TicketAnalyzer for Box<dyn TicketAnalyzer> {
    async fn analyze(&self, text: &str) -> Result<serde_json::Value> {
        (**self).analyze(text).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_serialization_roundtrip() {
        let classification = Classification {
            summary: "VPN will not connect".to_string(),
            category: "Network".to_string(),
            severity: Severity::High,
            key_entities: vec!["vpn".to_string(), "error".to_string()],
            reasoning: "Connection failure keywords".to_string(),
        };
        let json = serde_json::to_string(&classification).unwrap();
        let deserialized: Classification = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.category, "Network");
        assert_eq!(deserialized.severity, Severity::High);
        assert_eq!(deserialized.key_entities.len(), 2);
    }

    #[test]
    fn severity_rejects_unknown_values() {
        let result: std::result::Result<Severity, _> = serde_json::from_str("\"Catastrophic\"");
        assert!(result.is_err());
    }

    #[test]
    fn severity_accepts_all_four_levels() {
        for (raw, expected) in [
            ("\"Low\"", Severity::Low),
            ("\"Medium\"", Severity::Medium),
            ("\"High\"", Severity::High),
            ("\"Critical\"", Severity::Critical),
        ] {
            let severity: Severity = serde_json::from_str(raw).unwrap();
            assert_eq!(severity, expected);
        }
    }

    #[test]
    fn classification_rejects_missing_fields() {
        let json = r#"{"summary": "s", "category": "Bug"}"#;
        let result: std::result::Result<Classification, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
