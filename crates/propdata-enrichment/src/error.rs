use propdata_core::ErrorKind;
use thiserror::Error;

/// Errors raised inside the enrichment client.
///
/// These never cross the [`crate::EnrichmentClient`] boundary; the façade maps
/// each one to a [`propdata_core::LookupResult::Error`] through [`Self::kind`].
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint refused the client credentials.
    #[error("token request rejected with HTTP {status}")]
    TokenRejected { status: u16 },

    /// The search endpoint rejected the bearer token.
    #[error("search rejected bearer token with HTTP {status}")]
    Unauthorized { status: u16 },

    #[error("{}", rate_limit_message(*.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed JSON that does not match any recognized envelope.
    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("unrecognized match code \"{0}\"")]
    UnrecognizedMatchCode(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A concurrent token refresh this caller waited on failed; carries that
    /// refresh's outcome.
    #[error("token refresh failed: {message}")]
    SharedRefreshFailure { kind: ErrorKind, message: String },
}

impl EnrichmentError {
    /// The caller-facing failure category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrichmentError::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            EnrichmentError::Http(e) if e.is_decode() => ErrorKind::ParseError,
            EnrichmentError::Http(_) | EnrichmentError::InvalidBaseUrl { .. } => ErrorKind::Network,
            EnrichmentError::TokenRejected { .. } | EnrichmentError::Unauthorized { .. } => {
                ErrorKind::Auth
            }
            EnrichmentError::RateLimited { .. } => ErrorKind::RateLimited,
            EnrichmentError::UnexpectedStatus { .. } => ErrorKind::Upstream,
            EnrichmentError::Deserialize { .. }
            | EnrichmentError::Malformed(_)
            | EnrichmentError::UnrecognizedMatchCode(_) => ErrorKind::ParseError,
            EnrichmentError::SharedRefreshFailure { kind, .. } => *kind,
        }
    }
}

fn rate_limit_message(retry_after_secs: Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!("rate limited by provider (retry after {secs}s)"),
        None => "rate limited by provider".to_owned(),
    }
}

/// Invalid lookup parameters. These are caller bugs, not runtime conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("address lookup needs at least one of city, state or zip")]
    MissingLocality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_variants_share_kind() {
        assert_eq!(
            EnrichmentError::TokenRejected { status: 401 }.kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            EnrichmentError::Unauthorized { status: 403 }.kind(),
            ErrorKind::Auth
        );
    }

    #[test]
    fn unknown_match_code_is_parse_error() {
        assert_eq!(
            EnrichmentError::UnrecognizedMatchCode("Q".to_owned()).kind(),
            ErrorKind::ParseError
        );
    }

    #[test]
    fn shared_failure_keeps_original_kind() {
        let err = EnrichmentError::SharedRefreshFailure {
            kind: ErrorKind::Timeout,
            message: "timed out".to_owned(),
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn rate_limited_message_includes_retry_after() {
        let err = EnrichmentError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert_eq!(err.to_string(), "rate limited by provider (retry after 30s)");
        assert_eq!(
            EnrichmentError::RateLimited {
                retry_after_secs: None
            }
            .to_string(),
            "rate limited by provider"
        );
    }

    #[test]
    fn deserialize_error_is_parse_error() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = EnrichmentError::Deserialize {
            context: "address search".to_owned(),
            source,
        };
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }
}
