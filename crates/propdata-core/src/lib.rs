pub mod config;
pub mod lookup;
pub mod provider_config;
pub mod record;

pub use config::{load_provider_config, load_provider_config_from_env};
pub use lookup::{ClientStatus, ConfigurationStatus, ErrorKind, LookupResult};
pub use provider_config::{Credentials, ProviderConfig};
pub use record::{CandidateSummary, PropertyRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
