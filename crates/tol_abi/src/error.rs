use thiserror::Error;

/// Integrity failures when validating externally supplied ABI/storage JSON
/// (`spec.md` §7 "invalid embedded JSON").
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("malformed ABI JSON: {0}")]
    MalformedAbi(#[source] serde_json::Error),

    #[error("malformed storage JSON: {0}")]
    MalformedStorage(#[source] serde_json::Error),
}
