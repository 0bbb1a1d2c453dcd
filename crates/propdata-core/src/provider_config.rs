use std::time::Duration;

pub const DEFAULT_CLIENT_REFERENCE: &str = "propdata";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 1800;

/// Connection details for the property-data provider.
///
/// Only constructed when every required value is present, so holding a
/// `Credentials` means the provider is configured.
#[derive(Clone)]
pub struct Credentials {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Provider product/source identifier sent with every search.
    pub feed_id: String,
    /// Caller-reference tag sent with every search for provider-side billing
    /// and audit.
    pub client_reference: String,
    pub timeout: Duration,
    /// Logs raw provider payloads at `debug` level when set.
    pub debug: bool,
}

impl Credentials {
    /// Creates credentials with the default timeout, caller-reference tag and
    /// debug off.
    #[must_use]
    pub fn new(base_url: &str, client_id: &str, client_secret: &str, feed_id: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            feed_id: feed_id.to_owned(),
            client_reference: DEFAULT_CLIENT_REFERENCE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_client_reference(mut self, client_reference: &str) -> Self {
        self.client_reference = client_reference.to_owned();
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("feed_id", &self.feed_id)
            .field("client_reference", &self.client_reference)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Process-wide enrichment configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// `None` when any required credential variable is absent or blank.
    pub credentials: Option<Credentials>,
    /// Names of the required variables that were absent or blank.
    pub missing: Vec<String>,
    pub debug: bool,
    /// Lifetime of cached lookup results; zero disables caching.
    pub cache_ttl: Duration,
    pub log_level: String,
}

impl ProviderConfig {
    /// A configuration with no provider credentials and default settings.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            credentials: None,
            missing: Vec::new(),
            debug: false,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            log_level: "info".to_owned(),
        }
    }

    /// A configuration wrapping the given credentials with default settings.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            debug: credentials.debug,
            credentials: Some(credentials),
            ..Self::unconfigured()
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}
