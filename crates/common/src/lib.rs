//! Common error types shared across the triage service crates.

pub mod error;

pub use error::{ProviderError, Result, TriageError};
