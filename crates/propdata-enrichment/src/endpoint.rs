//! Provider endpoint URLs and the shared HTTP client.

use std::time::Duration;

use propdata_core::Credentials;
use reqwest::{Client, Url};

use crate::error::EnrichmentError;

pub const TOKEN_PATH: &str = "oauth2/token";
pub const SEARCH_PATH: &str = "property/v1/search";

const USER_AGENT: &str = "propdata/0.1 (property-enrichment)";

/// Resolves `path` against the provider base URL.
///
/// The base is normalised to end with exactly one slash so a base with a path
/// prefix (e.g. `https://host/v2`) keeps that prefix instead of having its
/// last segment replaced.
///
/// # Errors
///
/// Returns [`EnrichmentError::InvalidBaseUrl`] if `base_url` does not parse.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<Url, EnrichmentError> {
    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    let invalid = |reason: String| EnrichmentError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };
    let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_owned()));
    }
    base.join(path).map_err(|e| invalid(e.to_string()))
}

/// Builds the HTTP client shared by token and search requests.
///
/// The configured timeout bounds each whole request, so both suspension points
/// honour it.
///
/// # Errors
///
/// Returns [`EnrichmentError::Http`] if the `reqwest::Client` cannot be built.
pub fn build_http_client(credentials: &Credentials) -> Result<Client, EnrichmentError> {
    let client = Client::builder()
        .timeout(credentials.timeout)
        .connect_timeout(credentials.timeout.min(Duration::from_secs(10)))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
