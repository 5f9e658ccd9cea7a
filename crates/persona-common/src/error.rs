//! Error types shared across the persona crates.
//!
//! `EngineError` never reaches callers of the engine functions: every public
//! engine entry point logs it and falls back to its documented default.
//! `CommonError` covers infrastructure (Redis) and is wrapped by the server
//! crate's own error type via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed score for {key}: {reason}")]
    MalformedScore { key: String, reason: String },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("expected a JSON object of scores, got {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis unavailable, degrading gracefully")]
    RedisUnavailable,
}
