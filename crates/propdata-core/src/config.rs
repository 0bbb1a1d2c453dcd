use std::time::Duration;

use crate::provider_config::{
    Credentials, ProviderConfig, DEFAULT_CACHE_TTL_SECS, DEFAULT_CLIENT_REFERENCE,
    DEFAULT_TIMEOUT_SECS,
};
use crate::ConfigError;

/// Variables that must all be present for the provider to count as configured.
const REQUIRED_VARS: [&str; 4] = [
    "PROPDATA_BASE_URL",
    "PROPDATA_CLIENT_ID",
    "PROPDATA_CLIENT_SECRET",
    "PROPDATA_FEED_ID",
];

/// Load provider configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if an optional value is present but malformed.
/// Missing credentials are not an error; they yield an unconfigured provider.
pub fn load_provider_config() -> Result<ProviderConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_provider_config_from_env()
}

/// Load provider configuration from environment variables already in the process.
///
/// Unlike [`load_provider_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if an optional value is present but malformed.
pub fn load_provider_config_from_env() -> Result<ProviderConfig, ConfigError> {
    build_provider_config(|key| std::env::var(key))
}

/// Build provider configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`
/// lookup.
fn build_provider_config<F>(lookup: F) -> Result<ProviderConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    // Blank values count as absent.
    let present = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { present(var).unwrap_or_else(|| default.to_owned()) };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match present(var) {
            None => Ok(default),
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            }),
        }
    };

    let debug = present("PROPDATA_DEBUG").is_some_and(|raw| parse_flag(&raw));
    let log_level = or_default("PROPDATA_LOG_LEVEL", "info");
    let cache_ttl_secs = parse_u64("PROPDATA_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
    let timeout_secs = parse_u64("PROPDATA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
    if timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROPDATA_TIMEOUT_SECS".to_owned(),
            reason: "timeout must be greater than zero".to_owned(),
        });
    }

    let missing: Vec<String> = REQUIRED_VARS
        .iter()
        .filter(|&&var| present(var).is_none())
        .map(|var| (*var).to_owned())
        .collect();

    let credentials = match (
        present("PROPDATA_BASE_URL"),
        present("PROPDATA_CLIENT_ID"),
        present("PROPDATA_CLIENT_SECRET"),
        present("PROPDATA_FEED_ID"),
    ) {
        (Some(base_url), Some(client_id), Some(client_secret), Some(feed_id)) => Some(Credentials {
            base_url,
            client_id,
            client_secret,
            feed_id,
            client_reference: or_default("PROPDATA_CLIENT_REFERENCE", DEFAULT_CLIENT_REFERENCE),
            timeout: Duration::from_secs(timeout_secs),
            debug,
        }),
        _ => None,
    };

    Ok(ProviderConfig {
        credentials,
        missing,
        debug,
        cache_ttl: Duration::from_secs(cache_ttl_secs),
        log_level,
    })
}

/// Parse a boolean-ish flag. Anything unrecognized is `false`.
fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
