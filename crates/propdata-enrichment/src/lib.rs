//! Property-data enrichment client.
//!
//! [`EnrichmentClient`] is the single entry point: it checks the in-process
//! [`cache::LookupCache`], obtains a bearer token from the
//! [`token::TokenManager`], issues the provider search through
//! [`search::SearchClient`], and shapes the payload with [`normalize`].
//! Every expected failure comes back as a [`LookupResult`], never as an error.

pub mod cache;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod normalize;
pub mod query;
pub mod search;
pub mod token;

pub use cache::{CacheKey, LookupCache};
pub use client::EnrichmentClient;
pub use error::{EnrichmentError, QueryError};
pub use propdata_core::{
    CandidateSummary, ClientStatus, ConfigurationStatus, ErrorKind, LookupResult, PropertyRecord,
};
pub use query::{AddressQuery, ParcelQuery};
pub use search::{SearchClient, SearchOutcome};
pub use token::{Token, TokenManager};
