use std::path::Path;

use serde::{Deserialize, Serialize};
use triage_common::{Result, TriageError};

/// One known issue in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    pub title: String,
    pub category: String,
    pub symptoms: Vec<String>,
    pub recommended_action: String,
}

impl KnowledgeEntry {
    /// Text the entry is indexed under: title, category and symptoms.
    pub fn index_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.category,
            self.symptoms.join(" ")
        )
    }
}

/// Load the corpus from a JSON file containing an array of entries.
///
/// Any failure here is fatal at startup, never a per-query error.
pub fn load_entries(path: impl AsRef<Path>) -> Result<Vec<KnowledgeEntry>> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|e| {
        TriageError::Index(format!(
            "failed to read knowledge base '{}': {e}",
            path.display()
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        TriageError::Index(format!(
            "failed to parse knowledge base '{}': {e}",
            path.display()
        ))
    })
}
