//! Classification provider layer for the triage service.
//!
//! A [`TicketAnalyzer`] is one opaque async capability: raw ticket text in,
//! raw structured classification data out. Concrete analyzers (a remote
//! OpenAI-compatible backend, a deterministic rule-based mock) are selected
//! once at construction time via [`build_analyzer`].
//!
//! The [`ProviderGateway`] wraps whichever analyzer was built with a hard
//! per-attempt timeout and a bounded exponential-backoff retry policy, and
//! normalizes every terminal failure into a [`ProviderError`].
//!
//! [`ProviderError`]: triage_common::ProviderError

pub mod client;
pub mod config;
pub mod gateway;
pub mod mock;
pub mod openai;

pub use client::{Classification, Severity, TicketAnalyzer};
pub use config::{build_analyzer, ProviderSettings};
pub use gateway::{ProviderGateway, RetryConfig};
pub use mock::MockAnalyzer;
pub use openai::OpenAiAnalyzer;
