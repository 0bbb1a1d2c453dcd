//! The enrichment façade.

use std::sync::Arc;
use std::time::Duration;

use propdata_core::{
    ClientStatus, ConfigurationStatus, Credentials, LookupResult, PropertyRecord, ProviderConfig,
};

use crate::cache::{CacheKey, LookupCache};
use crate::endpoint::build_http_client;
use crate::error::{EnrichmentError, QueryError};
use crate::normalize::{normalize, summarize_candidate};
use crate::query::{AddressQuery, ParcelQuery};
use crate::search::{SearchClient, SearchOutcome};
use crate::token::TokenManager;

/// Property lookups with caching, token management and graceful degradation.
///
/// Cloning is cheap; all clones share one token and one cache. Every lookup
/// resolves to a [`LookupResult`]; only malformed parameters produce an
/// `Err`.
#[derive(Clone)]
pub struct EnrichmentClient {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Option<Provider>,
    cache: LookupCache,
    status: ConfigurationStatus,
}

struct Provider {
    tokens: Arc<TokenManager>,
    search: SearchClient,
}

enum SearchRequest {
    Address(AddressQuery),
    Parcel(ParcelQuery),
}

impl SearchRequest {
    fn cache_key(&self) -> CacheKey {
        match self {
            SearchRequest::Address(query) => query.cache_key(),
            SearchRequest::Parcel(query) => query.cache_key(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SearchRequest::Address(_) => "address",
            SearchRequest::Parcel(_) => "parcel",
        }
    }
}

impl Provider {
    async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, EnrichmentError> {
        match request {
            SearchRequest::Address(query) => self.search.search_by_address(query).await,
            SearchRequest::Parcel(query) => self.search.search_by_parcel(query).await,
        }
    }
}

impl EnrichmentClient {
    /// Builds a client from loaded configuration.
    ///
    /// An unconfigured provider is not an error: the client is created and
    /// every lookup returns [`LookupResult::NotConfigured`] without network
    /// access.
    ///
    /// # Errors
    ///
    /// - [`EnrichmentError::InvalidBaseUrl`] if the configured base URL is invalid.
    /// - [`EnrichmentError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, EnrichmentError> {
        let provider = config
            .credentials
            .as_ref()
            .map(|credentials| {
                let client = build_http_client(credentials)?;
                let tokens = Arc::new(TokenManager::new(client.clone(), credentials)?);
                let search = SearchClient::new(client, credentials, Arc::clone(&tokens))?;
                Ok::<_, EnrichmentError>(Provider { tokens, search })
            })
            .transpose()?;

        if provider.is_none() {
            tracing::warn!(
                missing = ?config.missing,
                "property enrichment provider not configured; lookups will return not_configured"
            );
        }

        Ok(Self {
            inner: Arc::new(Inner {
                provider,
                cache: LookupCache::new(config.cache_ttl),
                status: ConfigurationStatus {
                    provider_configured: config.is_configured(),
                    missing: config.missing.clone(),
                    debug: config.debug,
                },
            }),
        })
    }

    /// Builds a configured client from explicit credentials.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn from_credentials(
        credentials: Credentials,
        cache_ttl: Duration,
    ) -> Result<Self, EnrichmentError> {
        let config = ProviderConfig {
            cache_ttl,
            ..ProviderConfig::with_credentials(credentials)
        };
        Self::new(&config)
    }

    /// Looks up a property by street address.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if `street` is blank or no locality part is
    /// given. Validation runs before the configuration check.
    pub async fn lookup_by_address(
        &self,
        street: &str,
        city: Option<&str>,
        state: Option<&str>,
        zip: Option<&str>,
    ) -> Result<LookupResult, QueryError> {
        let query = AddressQuery::new(street, city, state, zip)?;
        Ok(self.lookup(SearchRequest::Address(query)).await)
    }

    /// Looks up a property by assessor parcel number and county FIPS code.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyField`] if either part is blank.
    pub async fn lookup_by_parcel(&self, apn: &str, fips: &str) -> Result<LookupResult, QueryError> {
        let query = ParcelQuery::new(apn, fips)?;
        Ok(self.lookup(SearchRequest::Parcel(query)).await)
    }

    /// Whether the provider is configured. Performs no I/O.
    #[must_use]
    pub fn configuration_status(&self) -> ConfigurationStatus {
        self.inner.status.clone()
    }

    /// Configuration status plus the current token expiry and cache size.
    pub async fn status(&self) -> ClientStatus {
        let token_expires_at = match &self.inner.provider {
            Some(provider) => provider.tokens.cached_expiry().await,
            None => None,
        };
        ClientStatus {
            configuration: self.configuration_status(),
            token_expires_at,
            cached_entries: self.inner.cache.len().await,
        }
    }

    pub async fn clear_cache(&self) {
        self.inner.cache.clear().await;
    }

    /// Sweeps expired cache entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.inner.cache.purge_expired().await
    }

    pub async fn cache_len(&self) -> usize {
        self.inner.cache.len().await
    }

    async fn lookup(&self, request: SearchRequest) -> LookupResult {
        let Some(provider) = &self.inner.provider else {
            tracing::debug!(lookup = request.label(), "skipping lookup; provider not configured");
            return LookupResult::NotConfigured;
        };

        let key = request.cache_key();
        if let Some(hit) = self.inner.cache.get(&key).await {
            tracing::debug!(lookup = request.label(), %key, "lookup served from cache");
            return hit;
        }

        let result = match search_with_reauth(provider, &request).await {
            Ok(outcome) => shape(outcome),
            Err(err) => {
                tracing::warn!(
                    lookup = request.label(),
                    kind = %err.kind(),
                    error = %err,
                    "property lookup failed"
                );
                LookupResult::Error {
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
        };

        if result.is_cacheable() {
            self.inner.cache.put(key, result.clone()).await;
        }
        tracing::info!(
            lookup = request.label(),
            outcome = outcome_label(&result),
            "property lookup complete"
        );
        result
    }
}

/// Runs the search, re-authenticating and retrying once if the bearer token
/// is rejected.
///
/// Every rejected token is dropped, including the one used for the retry, so
/// the next lookup starts from a fresh token request.
async fn search_with_reauth(
    provider: &Provider,
    request: &SearchRequest,
) -> Result<SearchOutcome, EnrichmentError> {
    match provider.search(request).await {
        Err(EnrichmentError::Unauthorized { status }) => {
            tracing::info!(status, "search rejected bearer token; re-authenticating");
            provider.tokens.invalidate().await;
            let retried = provider.search(request).await;
            if let Err(EnrichmentError::Unauthorized { status }) = &retried {
                tracing::warn!(status, "search rejected refreshed bearer token");
                provider.tokens.invalidate().await;
            }
            retried
        }
        other => other,
    }
}

fn shape(outcome: SearchOutcome) -> LookupResult {
    match outcome {
        SearchOutcome::Single(profile) => {
            let record: PropertyRecord = normalize(&profile);
            if record.is_empty() {
                tracing::warn!("single match normalized to an empty record");
            }
            LookupResult::Success { record }
        }
        SearchOutcome::Multiple(candidates) => LookupResult::MultiMatch {
            candidates: candidates.iter().map(summarize_candidate).collect(),
        },
        SearchOutcome::NoMatch => LookupResult::NotFound,
    }
}

fn outcome_label(result: &LookupResult) -> &'static str {
    match result {
        LookupResult::Success { .. } => "success",
        LookupResult::MultiMatch { .. } => "multi_match",
        LookupResult::NotFound => "not_found",
        LookupResult::NotConfigured => "not_configured",
        LookupResult::Error { .. } => "error",
    }
}
