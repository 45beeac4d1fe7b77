use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before any script runs (empty seat list, non-positive expiry).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("script '{script}' returned a malformed payload: {source}")]
    MalformedReply {
        script: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
