//! Property search against the provider.
//!
//! Issues authenticated `GET property/v1/search` requests and classifies the
//! envelope by its match code. Normalization of the profile happens later, in
//! [`crate::normalize`].

use std::sync::Arc;

use propdata_core::Credentials;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::endpoint::{endpoint_url, SEARCH_PATH};
use crate::error::EnrichmentError;
use crate::normalize::{locate_profile, scalar_text};
use crate::query::{AddressQuery, ParcelQuery};
use crate::token::TokenManager;

/// Envelope fields that may carry the match code, tried in order.
const MATCH_CODE_FIELDS: &[&str] = &["MatchCode", "matchCode", "match_code"];

/// Envelope fields that may carry the multi-match candidate list, tried in order.
const CANDIDATE_FIELDS: &[&str] = &["Candidates", "PropertyMatches", "Matches"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    Single,
    Multiple,
    NoMatch,
}

/// Recognized match codes, compared case-insensitively.
const MATCH_CODES: &[(&str, MatchKind)] = &[
    ("S", MatchKind::Single),
    ("SINGLE", MatchKind::Single),
    ("EXACT", MatchKind::Single),
    ("1", MatchKind::Single),
    ("M", MatchKind::Multiple),
    ("MULTI", MatchKind::Multiple),
    ("MULTIPLE", MatchKind::Multiple),
    ("2", MatchKind::Multiple),
    ("N", MatchKind::NoMatch),
    ("NONE", MatchKind::NoMatch),
    ("NO_MATCH", MatchKind::NoMatch),
    ("0", MatchKind::NoMatch),
];

/// A classified search response.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Exactly one property; carries its profile object.
    Single(Value),
    /// Several plausible properties; carries the raw candidate objects.
    Multiple(Vec<Value>),
    NoMatch,
}

/// Authenticated client for the provider's search endpoint.
pub struct SearchClient {
    client: Client,
    search_url: Url,
    tokens: Arc<TokenManager>,
    feed_id: String,
    client_reference: String,
    debug: bool,
}

impl SearchClient {
    /// # Errors
    ///
    /// Returns [`EnrichmentError::InvalidBaseUrl`] if the base URL is invalid.
    pub fn new(
        client: Client,
        credentials: &Credentials,
        tokens: Arc<TokenManager>,
    ) -> Result<Self, EnrichmentError> {
        Ok(Self {
            client,
            search_url: endpoint_url(&credentials.base_url, SEARCH_PATH)?,
            tokens,
            feed_id: credentials.feed_id.clone(),
            client_reference: credentials.client_reference.clone(),
            debug: credentials.debug,
        })
    }

    /// Searches by street address and locality line.
    ///
    /// # Errors
    ///
    /// - [`EnrichmentError::Unauthorized`] on HTTP 401 or 403.
    /// - [`EnrichmentError::RateLimited`] on HTTP 429.
    /// - [`EnrichmentError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`EnrichmentError::Http`] on network failure or timeout.
    /// - [`EnrichmentError::Deserialize`], [`EnrichmentError::Malformed`] or
    ///   [`EnrichmentError::UnrecognizedMatchCode`] if the body cannot be
    ///   classified.
    /// - Any error from [`TokenManager::ensure_token`].
    pub async fn search_by_address(
        &self,
        query: &AddressQuery,
    ) -> Result<SearchOutcome, EnrichmentError> {
        let last_line = query.last_line();
        let url = self.build_url(&[("address", &query.street), ("lastLine", &last_line)]);
        self.execute(url, "address search").await
    }

    /// Searches by assessor parcel number and county FIPS code.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search_by_address`].
    pub async fn search_by_parcel(
        &self,
        query: &ParcelQuery,
    ) -> Result<SearchOutcome, EnrichmentError> {
        let url = self.build_url(&[("apn", &query.apn), ("fips", &query.fips)]);
        self.execute(url, "parcel search").await
    }

    /// Appends `feedId`, `clientReference` and `extra` as percent-encoded
    /// query parameters.
    fn build_url(&self, extra: &[(&str, &str)]) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("feedId", &self.feed_id);
            pairs.append_pair("clientReference", &self.client_reference);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    async fn execute(&self, url: Url, context: &str) -> Result<SearchOutcome, EnrichmentError> {
        let token = self.tokens.ensure_token().await?;
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&token.value)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EnrichmentError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(EnrichmentError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(EnrichmentError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.search_url.to_string(),
            });
        }

        let body = response.text().await?;
        if self.debug {
            tracing::debug!(context, body = %body, "raw provider response");
        }
        let payload: Value =
            serde_json::from_str(&body).map_err(|e| EnrichmentError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;
        interpret(&payload)
    }
}

/// Classifies a search envelope by its match code.
///
/// # Errors
///
/// - [`EnrichmentError::UnrecognizedMatchCode`] for a code outside the table.
/// - [`EnrichmentError::Malformed`] when the code is missing, a single match
///   has no profile, or a multi-match has no candidates.
pub fn interpret(payload: &Value) -> Result<SearchOutcome, EnrichmentError> {
    let code = MATCH_CODE_FIELDS
        .iter()
        .find_map(|name| payload.get(*name).and_then(scalar_text))
        .ok_or_else(|| EnrichmentError::Malformed("response has no match code".into()))?;

    let kind = MATCH_CODES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(&code))
        .map(|(_, kind)| *kind)
        .ok_or(EnrichmentError::UnrecognizedMatchCode(code))?;

    match kind {
        MatchKind::Single => locate_profile(payload)
            .cloned()
            .map(SearchOutcome::Single)
            .ok_or_else(|| EnrichmentError::Malformed("single match without a profile".into())),
        MatchKind::Multiple => CANDIDATE_FIELDS
            .iter()
            .find_map(|name| payload.get(*name).and_then(Value::as_array))
            .filter(|candidates| !candidates.is_empty())
            .map(|candidates| SearchOutcome::Multiple(candidates.clone()))
            .ok_or_else(|| EnrichmentError::Malformed("multi-match without candidates".into())),
        MatchKind::NoMatch => Ok(SearchOutcome::NoMatch),
    }
}
