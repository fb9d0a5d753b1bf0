//! Triage orchestration: composes the provider gateway and the knowledge
//! index into the end-to-end ticket -> result transformation.

pub mod config;
pub mod service;

pub use config::{KnowledgeSettings, LimitSettings, TriageConfig};
pub use service::{TriageResult, TriageService};
