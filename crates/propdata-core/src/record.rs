use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A property profile returned by the data provider, normalized into a stable
/// shape regardless of which feed or region produced it.
///
/// Every field is optional. `None` means the provider did not supply a value;
/// an empty string is never used as a stand-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Street line without unit, e.g. `"1358 5TH ST"`.
    pub street_address: Option<String>,
    pub unit: Option<String>,
    pub city: Option<String>,
    /// Two-letter state code.
    pub state: Option<String>,
    /// Five-digit ZIP.
    pub zip: Option<String>,
    /// ZIP+4 suffix, when the provider supplies one.
    pub zip4: Option<String>,
    /// Assessor parcel number (APN).
    pub parcel_number: Option<String>,
    pub county: Option<String>,
    /// Five-digit state+county FIPS code.
    pub fips: Option<String>,
    /// Brief legal description, e.g. `"LOT 1 BLK 2 TRACT 12345"`.
    pub legal_description: Option<String>,
    pub subdivision: Option<String>,
    pub lot: Option<String>,
    pub block: Option<String>,
    pub tract: Option<String>,
    pub owner_name: Option<String>,
    pub secondary_owner_name: Option<String>,
    pub property_type: Option<String>,
    pub land_use: Option<String>,
    pub year_built: Option<u16>,
    pub assessed_value: Option<Decimal>,
    pub land_value: Option<Decimal>,
    pub improvement_value: Option<Decimal>,
    pub tax_year: Option<u16>,
}

impl PropertyRecord {
    /// Returns `true` if the provider supplied no usable field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Single-line street address with unit, e.g. `"1358 5TH ST UNIT 2"`.
    #[must_use]
    pub fn address_line(&self) -> Option<String> {
        let street = self.street_address.as_deref()?;
        Some(match self.unit.as_deref() {
            Some(unit) => format!("{street} {unit}"),
            None => street.to_owned(),
        })
    }
}

/// A summary of one candidate property from a multi-match response, enough
/// for the caller to let a user pick the intended property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub street_address: Option<String>,
    pub unit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub parcel_number: Option<String>,
    pub fips: Option<String>,
    pub owner_name: Option<String>,
}
