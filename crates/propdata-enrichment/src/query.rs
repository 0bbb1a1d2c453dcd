//! Validated lookup parameters.

use crate::cache::CacheKey;
use crate::error::QueryError;

/// An address search: a street plus at least one locality part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery {
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl AddressQuery {
    /// Trims every part and drops blank optional parts.
    ///
    /// # Errors
    ///
    /// - [`QueryError::EmptyField`] if `street` is blank.
    /// - [`QueryError::MissingLocality`] if city, state and zip are all blank.
    pub fn new(
        street: &str,
        city: Option<&str>,
        state: Option<&str>,
        zip: Option<&str>,
    ) -> Result<Self, QueryError> {
        let street = required(street, "street")?;
        let query = Self {
            street,
            city: optional(city),
            state: optional(state),
            zip: optional(zip),
        };
        if query.city.is_none() && query.state.is_none() && query.zip.is_none() {
            return Err(QueryError::MissingLocality);
        }
        Ok(query)
    }

    /// The combined locality line sent to the provider, e.g. `"La Verne, CA 91750"`.
    #[must_use]
    pub fn last_line(&self) -> String {
        let tail = [self.state.as_deref(), self.zip.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        match (self.city.as_deref(), tail.is_empty()) {
            (Some(city), false) => format!("{city}, {tail}"),
            (Some(city), true) => city.to_owned(),
            (None, _) => tail,
        }
    }

    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::address(
            &self.street,
            self.city.as_deref(),
            self.state.as_deref(),
            self.zip.as_deref(),
        )
    }
}

/// A parcel search by assessor parcel number within a county FIPS code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelQuery {
    pub apn: String,
    pub fips: String,
}

impl ParcelQuery {
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyField`] if either part is blank.
    pub fn new(apn: &str, fips: &str) -> Result<Self, QueryError> {
        Ok(Self {
            apn: required(apn, "apn")?,
            fips: required(fips, "fips")?,
        })
    }

    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::parcel(&self.apn, &self.fips)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, QueryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(QueryError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
