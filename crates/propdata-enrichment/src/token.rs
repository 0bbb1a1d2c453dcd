//! OAuth client-credentials token lifecycle.
//!
//! [`TokenManager`] caches one bearer token per process, refreshes it 60 s
//! before expiry, and funnels concurrent refreshes through a single in-flight
//! token request.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use propdata_core::{Credentials, ErrorKind};
use reqwest::{Client, Url};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::endpoint::{endpoint_url, TOKEN_PATH};
use crate::error::EnrichmentError;
use crate::normalize::scalar_text;

/// Tokens are treated as stale this long before their actual expiry. Short
/// lifetimes use half the lifetime instead.
pub const REFRESH_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Upper bound on an advertised lifetime, so a bogus `expires_in` cannot pin a
/// token forever.
const MAX_EXPIRES_IN_SECS: u64 = 86_400;

/// A bearer token, the instant it stops being valid, and the instant after
/// which it should be replaced.
#[derive(Clone)]
pub struct Token {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_at: DateTime<Utc>,
}

impl Token {
    /// A token issued at `issued_at` that lives for `lifetime`.
    ///
    /// The refresh point sits [`REFRESH_SKEW_SECS`] before expiry, or halfway
    /// through the lifetime when that is shorter.
    #[must_use]
    pub fn issued(value: String, issued_at: DateTime<Utc>, lifetime: TimeDelta) -> Self {
        let skew = TimeDelta::seconds(REFRESH_SKEW_SECS).min(lifetime / 2);
        let expires_at = issued_at + lifetime;
        Self {
            value,
            expires_at,
            refresh_at: expires_at - skew,
        }
    }

    /// Whether the token can still be used at `now` without refreshing.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.refresh_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("refresh_at", &self.refresh_at)
            .finish()
    }
}

/// Outcome of the last failed refresh, replayed to callers that queued behind it.
#[derive(Debug, Clone)]
struct RefreshFailure {
    kind: ErrorKind,
    message: String,
}

#[derive(Debug, Default)]
struct RefreshState {
    last_failure: Option<RefreshFailure>,
}

/// Acquires and caches provider access tokens.
pub struct TokenManager {
    client: Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    current: RwLock<Option<Token>>,
    refresh: Mutex<RefreshState>,
    /// Number of completed token requests; lets a queued caller tell whether a
    /// refresh finished while it was waiting for the lock.
    completed_refreshes: AtomicU64,
}

impl TokenManager {
    /// Creates a manager for the token endpoint under `credentials.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentError::InvalidBaseUrl`] if the base URL is invalid.
    pub fn new(client: Client, credentials: &Credentials) -> Result<Self, EnrichmentError> {
        Ok(Self {
            client,
            token_url: endpoint_url(&credentials.base_url, TOKEN_PATH)?,
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            current: RwLock::new(None),
            refresh: Mutex::new(RefreshState::default()),
            completed_refreshes: AtomicU64::new(0),
        })
    }

    /// Returns a valid token, requesting a new one only when the cached token
    /// is absent or within the refresh skew of expiring.
    ///
    /// Concurrent callers that all find the token stale share one token
    /// request: the first performs it while the rest wait on the refresh lock
    /// and then receive its result, success or failure. A waiter gets the
    /// token that refresh stored even if its lifetime is already inside the
    /// refresh window.
    ///
    /// # Errors
    ///
    /// - [`EnrichmentError::TokenRejected`] on a non-2xx token response.
    /// - [`EnrichmentError::Http`] on network failure or timeout.
    /// - [`EnrichmentError::Deserialize`] / [`EnrichmentError::Malformed`] if
    ///   the response is not a usable token payload.
    /// - [`EnrichmentError::SharedRefreshFailure`] if the refresh this caller
    ///   waited on failed.
    pub async fn ensure_token(&self) -> Result<Token, EnrichmentError> {
        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }

        let observed = self.completed_refreshes.load(Ordering::Acquire);
        let mut state = self.refresh.lock().await;

        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }
        if self.completed_refreshes.load(Ordering::Acquire) != observed {
            if let Some(failure) = &state.last_failure {
                return Err(EnrichmentError::SharedRefreshFailure {
                    kind: failure.kind,
                    message: failure.message.clone(),
                });
            }
            if let Some(token) = self.current.read().await.clone() {
                return Ok(token);
            }
        }

        let result = self.request_token().await;
        self.completed_refreshes.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(token) => {
                state.last_failure = None;
                *self.current.write().await = Some(token.clone());
                Ok(token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "provider token request failed");
                state.last_failure = Some(RefreshFailure {
                    kind: err.kind(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Drops the cached token so the next [`Self::ensure_token`] re-acquires.
    pub async fn invalidate(&self) {
        if self.current.write().await.take().is_some() {
            tracing::info!("provider token invalidated");
        }
    }

    /// Expiry of the cached token, if one is held.
    pub async fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.current.read().await.as_ref().map(|t| t.expires_at)
    }

    async fn fresh_token(&self) -> Option<Token> {
        let now = Utc::now();
        self.current
            .read()
            .await
            .as_ref()
            .filter(|t| t.is_fresh_at(now))
            .cloned()
    }

    /// Performs the client-credentials grant: HTTP Basic auth, form-encoded
    /// `grant_type=client_credentials`.
    async fn request_token(&self) -> Result<Token, EnrichmentError> {
        let response = self
            .client
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::TokenRejected {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let payload: Value =
            serde_json::from_str(&body).map_err(|e| EnrichmentError::Deserialize {
                context: "token response".to_owned(),
                source: e,
            })?;
        let token = parse_token_payload(&payload, Utc::now())?;
        tracing::info!(expires_at = %token.expires_at, "acquired provider access token");
        Ok(token)
    }
}

/// Extracts `access_token` and `expires_in` (seconds, number or numeric
/// string) from a token response.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]
fn parse_token_payload(payload: &Value, now: DateTime<Utc>) -> Result<Token, EnrichmentError> {
    let value = payload
        .get("access_token")
        .and_then(scalar_text)
        .ok_or_else(|| EnrichmentError::Malformed("token response missing access_token".into()))?;

    let expires_in = match payload.get("expires_in") {
        None | Some(Value::Null) => DEFAULT_EXPIRES_IN_SECS,
        Some(raw) => scalar_text(raw)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| secs as u64)
            .ok_or_else(|| {
                EnrichmentError::Malformed(format!("token response has invalid expires_in: {raw}"))
            })?,
    }
    .min(MAX_EXPIRES_IN_SECS);

    Ok(Token::issued(
        value,
        now,
        TimeDelta::seconds(expires_in as i64),
    ))
}
