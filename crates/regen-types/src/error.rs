use thiserror::Error;

/// Errors from key-value persistence backends (used by trait definitions in regen-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors from the generative and ranking collaborators.
///
/// None of these ever reach a caller of the resolver: generation errors
/// downgrade to pool selection, ranking errors downgrade to hash selection.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("collaborator unavailable")]
    Unavailable,

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("response carried no image payload")]
    EmptyPayload,
}

/// Errors crossing the resolution boundary between the orchestrator and the resolver.
///
/// Every variant is treated as transient and retried by the orchestrator.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to decode resolution response: {0}")]
    Decode(String),

    #[error("resolution returned an empty identifier")]
    EmptyIdentifier,
}

/// Errors raised while validating configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("image pool must contain at least one identifier")]
    EmptyPool,

    #[error("used image store capacity must be greater than zero")]
    ZeroCapacity,

    #[error("orchestrator max_attempts must be at least 1")]
    ZeroAttempts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_image_error_display() {
        let err = ImageError::Provider {
            message: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "provider error: HTTP 500");
    }

    #[test]
    fn test_resolve_error_display() {
        assert_eq!(ResolveError::Status(503).to_string(), "unexpected HTTP status 503");
        assert!(ResolveError::EmptyIdentifier.to_string().contains("empty identifier"));
    }
}
