//! Error taxonomy for the triage service.

use thiserror::Error;

/// Terminal failure of the classification provider, surfaced once the retry
/// budget is spent (or immediately, for non-transient failures).
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The final attempt's hard timeout elapsed.
    #[error("provider timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    /// The final attempt failed for a non-timeout reason.
    #[error("provider failed after {attempts} attempt(s): {detail}")]
    Exhausted { attempts: u32, detail: String },

    /// The provider replied, but the payload did not match the expected
    /// classification shape. Never retried: schema violations are not
    /// transient.
    #[error("provider returned a malformed classification: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A single provider attempt failed in transit (connection, HTTP status,
    /// unparseable reply). Transient from the gateway's point of view.
    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("knowledge index error: {0}")]
    Index(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_includes_attempts() {
        let err = ProviderError::Timeout { attempts: 3 };
        assert!(err.to_string().contains("3 attempt"));

        let err = ProviderError::Exhausted {
            attempts: 2,
            detail: "connection refused".into(),
        };
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn provider_error_wraps_into_triage_error() {
        let err: TriageError = ProviderError::Invalid("missing severity".into()).into();
        assert!(matches!(
            err,
            TriageError::Provider(ProviderError::Invalid(_))
        ));
    }
}
