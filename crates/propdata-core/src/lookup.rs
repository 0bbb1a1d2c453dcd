//! The request/response contract the enrichment client exposes to the rest of
//! the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{CandidateSummary, PropertyRecord};

/// Failure categories surfaced inside [`LookupResult::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credentials rejected, even after one re-authentication.
    Auth,
    /// Provider throttling; the caller should back off.
    RateLimited,
    /// A request exceeded the configured timeout.
    Timeout,
    /// The response did not match any recognized shape.
    ParseError,
    /// Connection-level failure reaching the provider.
    Network,
    /// The provider answered with an unexpected HTTP status.
    Upstream,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Auth => write!(f, "auth"),
            ErrorKind::RateLimited => write!(f, "rate_limited"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::ParseError => write!(f, "parse_error"),
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Upstream => write!(f, "upstream"),
        }
    }
}

/// Outcome of a single property lookup.
///
/// Every expected condition (provider down, no match, several matches,
/// missing configuration) is a variant here rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupResult {
    Success { record: PropertyRecord },
    MultiMatch { candidates: Vec<CandidateSummary> },
    NotFound,
    NotConfigured,
    Error { kind: ErrorKind, message: String },
}

impl LookupResult {
    /// Whether this result may be served again from cache.
    ///
    /// Errors and `NotConfigured` are transient and never cached.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        matches!(
            self,
            LookupResult::Success { .. } | LookupResult::MultiMatch { .. } | LookupResult::NotFound
        )
    }

    #[must_use]
    pub fn record(&self) -> Option<&PropertyRecord> {
        match self {
            LookupResult::Success { record } => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            LookupResult::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Cheap, side-effect-free description of whether enrichment is available.
///
/// Callers can probe this freely, e.g. to decide whether to offer an
/// enrichment step at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationStatus {
    pub provider_configured: bool,
    /// Required variables that were absent at startup.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    pub debug: bool,
}

/// Configuration status plus the client's live token and cache state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatus {
    #[serde(flatten)]
    pub configuration: ConfigurationStatus,
    /// Expiry of the currently cached bearer token, if any.
    pub token_expires_at: Option<DateTime<Utc>>,
    pub cached_entries: usize,
}
