use crate::endpoint::Endpoint;

/// Errors surfaced by client operations.
///
/// Every call reports at most one of these; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP transport failed before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The service answered with a non-200 status.
    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body of a `json`-format response was not valid JSON.
    #[error("failed to parse JSON response body")]
    Parse(#[from] serde_json::Error),

    /// A lookup was called without a usable `id` parameter. Raised before
    /// any request is issued.
    #[error("{endpoint} requires a non-empty `id` parameter")]
    MissingId { endpoint: Endpoint },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_the_code() {
        let err = Error::Status { status: 503, body: "unavailable".to_string() };
        let msg = err.to_string();

        assert!(msg.contains("503"));
        assert!(msg.contains("unavailable"));
    }

    #[test]
    fn missing_id_names_the_endpoint() {
        let err = Error::MissingId { endpoint: Endpoint::FootprintLookup };
        assert!(err.to_string().contains("footprintLookup"));
    }
}
