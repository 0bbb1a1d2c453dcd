//! Normalization of provider property profiles into [`PropertyRecord`].
//!
//! The provider's schema varies by feed and region, so every target field is
//! resolved through a [`FieldRule`]: a scope (the profile root, or an ordered
//! list of sub-object names) plus an ordered list of candidate source names.
//! The first candidate present with a non-empty value wins. Extending the
//! mapping means editing the tables below, not the resolution logic.

use std::str::FromStr;

use propdata_core::{CandidateSummary, PropertyRecord};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Envelope paths under which the provider nests the actual profile object,
/// tried in order.
pub const PROFILE_PATHS: &[&[&str]] = &[
    &["PropertyMatch", "Profile"],
    &["Result", "Profile"],
    &["Profile"],
];

/// Where a field's candidates are looked up.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    /// Directly on the profile object.
    Profile,
    /// Inside the first of these sub-objects that yields a value.
    Section(&'static [&'static str]),
}

/// Ordered fallback list for one target field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub scope: Scope,
    pub candidates: &'static [&'static str],
}

impl FieldRule {
    const fn new(scope: Scope, candidates: &'static [&'static str]) -> Self {
        Self { scope, candidates }
    }

    /// Resolves this rule against `profile`.
    #[must_use]
    pub fn resolve(&self, profile: &Value) -> Option<String> {
        match self.scope {
            Scope::Profile => profile.as_object().and_then(|obj| first_present(obj, self.candidates)),
            Scope::Section(sections) => sections
                .iter()
                .filter_map(|name| field(profile, name).and_then(Value::as_object))
                .find_map(|obj| first_present(obj, self.candidates)),
        }
    }
}

const SITE_ADDRESS: Scope = Scope::Section(&["SiteAddress", "PropertyAddress", "Address"]);
const LEGAL: Scope = Scope::Section(&["LegalDescription", "Legal", "LegalInfo"]);
const OWNER: Scope = Scope::Section(&["OwnerInformation", "Owner", "OwnerInfo", "Owners"]);
const CHARACTERISTICS: Scope =
    Scope::Section(&["PropertyCharacteristics", "Characteristics", "Building"]);
const ASSESSMENT: Scope = Scope::Section(&["Assessment", "TaxAssessment", "Valuation", "TaxInfo"]);

const STREET_NAMES: &[&str] = &["StreetAddress", "AddressLine1", "FullStreetAddress", "Street"];
const UNIT_NAMES: &[&str] = &["UnitNumber", "Unit", "UnitDesignator"];
const CITY_NAMES: &[&str] = &["City", "CityName", "SiteCity"];
const STATE_NAMES: &[&str] = &["State", "StateCode", "SiteState"];
const ZIP_NAMES: &[&str] = &["Zip", "ZipCode", "Zip5", "PostalCode"];
const APN_NAMES: &[&str] = &["APN", "ParcelNum", "ParcelNumber", "AssessorParcelNumber"];
const FIPS_NAMES: &[&str] = &["FIPS", "FipsCode", "CountyFips"];
const OWNER_NAMES: &[&str] = &["OwnerName", "Owner1FullName", "PrimaryOwnerName", "OwnerNamePrimary"];

pub const STREET: FieldRule = FieldRule::new(SITE_ADDRESS, STREET_NAMES);
pub const UNIT: FieldRule = FieldRule::new(SITE_ADDRESS, UNIT_NAMES);
pub const CITY: FieldRule = FieldRule::new(SITE_ADDRESS, CITY_NAMES);
pub const STATE: FieldRule = FieldRule::new(SITE_ADDRESS, STATE_NAMES);
pub const ZIP: FieldRule = FieldRule::new(SITE_ADDRESS, ZIP_NAMES);
pub const ZIP4: FieldRule = FieldRule::new(SITE_ADDRESS, &["Zip4", "ZipPlus4", "Plus4"]);

pub const PARCEL_NUMBER: FieldRule = FieldRule::new(Scope::Profile, APN_NAMES);
pub const FIPS: FieldRule = FieldRule::new(Scope::Profile, FIPS_NAMES);
pub const COUNTY: FieldRule = FieldRule::new(Scope::Profile, &["County", "CountyName"]);

pub const LEGAL_DESCRIPTION: FieldRule = FieldRule::new(
    LEGAL,
    &["LegalBriefDescription", "BriefDescription", "LegalDescription", "Description"],
);
pub const SUBDIVISION: FieldRule = FieldRule::new(LEGAL, &["Subdivision", "SubdivisionName"]);
pub const LOT: FieldRule = FieldRule::new(LEGAL, &["Lot", "LotNumber", "LotCode"]);
pub const BLOCK: FieldRule = FieldRule::new(LEGAL, &["Block", "BlockNumber"]);
pub const TRACT: FieldRule = FieldRule::new(LEGAL, &["Tract", "TractNumber"]);

pub const OWNER_FULL: FieldRule = FieldRule::new(OWNER, OWNER_NAMES);
pub const OWNER_FIRST: FieldRule = FieldRule::new(OWNER, &["Owner1FirstName", "FirstName"]);
pub const OWNER_LAST: FieldRule = FieldRule::new(OWNER, &["Owner1LastName", "LastName"]);
pub const SECONDARY_OWNER_FULL: FieldRule = FieldRule::new(
    OWNER,
    &["Owner2FullName", "SecondaryOwnerName", "OwnerNameSecondary"],
);
pub const SECONDARY_OWNER_FIRST: FieldRule = FieldRule::new(OWNER, &["Owner2FirstName"]);
pub const SECONDARY_OWNER_LAST: FieldRule = FieldRule::new(OWNER, &["Owner2LastName"]);

pub const PROPERTY_TYPE: FieldRule = FieldRule::new(
    CHARACTERISTICS,
    &["PropertyType", "PropertyTypeDescription", "PropType"],
);
pub const LAND_USE: FieldRule =
    FieldRule::new(CHARACTERISTICS, &["LandUse", "LandUseDescription", "UseCode"]);
pub const YEAR_BUILT: FieldRule =
    FieldRule::new(CHARACTERISTICS, &["YearBuilt", "YearBuiltEffective", "YrBuilt"]);

pub const ASSESSED_VALUE: FieldRule = FieldRule::new(
    ASSESSMENT,
    &["AssessedValue", "TotalAssessedValue", "AssessedTotal"],
);
pub const LAND_VALUE: FieldRule = FieldRule::new(ASSESSMENT, &["LandValue", "AssessedLandValue"]);
pub const IMPROVEMENT_VALUE: FieldRule = FieldRule::new(
    ASSESSMENT,
    &["ImprovementValue", "AssessedImprovementValue", "ImprovementsValue"],
);
pub const TAX_YEAR: FieldRule = FieldRule::new(ASSESSMENT, &["TaxYear", "AssessmentYear"]);

/// Descends a provider envelope to the nested profile object.
///
/// Returns `None` if none of [`PROFILE_PATHS`] leads to an object.
#[must_use]
pub fn locate_profile(envelope: &Value) -> Option<&Value> {
    PROFILE_PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(envelope, |node, segment| field(node, segment))
            .filter(|node| node.is_object())
    })
}

/// Converts a provider profile (or an envelope containing one) into a
/// [`PropertyRecord`].
#[must_use]
pub fn normalize(raw: &Value) -> PropertyRecord {
    let profile = locate_profile(raw).unwrap_or(raw);
    let (zip, zip_suffix) = split_zip(ZIP.resolve(profile));

    PropertyRecord {
        street_address: STREET.resolve(profile),
        unit: UNIT.resolve(profile),
        city: CITY.resolve(profile),
        state: STATE.resolve(profile),
        zip,
        zip4: ZIP4.resolve(profile).or(zip_suffix),
        parcel_number: PARCEL_NUMBER.resolve(profile),
        county: COUNTY.resolve(profile),
        fips: FIPS.resolve(profile),
        legal_description: LEGAL_DESCRIPTION.resolve(profile),
        subdivision: SUBDIVISION.resolve(profile),
        lot: LOT.resolve(profile),
        block: BLOCK.resolve(profile),
        tract: TRACT.resolve(profile),
        owner_name: full_name(profile, OWNER_FULL, OWNER_FIRST, OWNER_LAST),
        secondary_owner_name: full_name(
            profile,
            SECONDARY_OWNER_FULL,
            SECONDARY_OWNER_FIRST,
            SECONDARY_OWNER_LAST,
        ),
        property_type: PROPERTY_TYPE.resolve(profile),
        land_use: LAND_USE.resolve(profile),
        year_built: YEAR_BUILT.resolve(profile).as_deref().and_then(parse_year),
        assessed_value: ASSESSED_VALUE.resolve(profile).as_deref().and_then(parse_amount),
        land_value: LAND_VALUE.resolve(profile).as_deref().and_then(parse_amount),
        improvement_value: IMPROVEMENT_VALUE
            .resolve(profile)
            .as_deref()
            .and_then(parse_amount),
        tax_year: TAX_YEAR.resolve(profile).as_deref().and_then(parse_year),
    }
}

/// Summarizes one multi-match candidate.
///
/// Candidates come either flat or with the same sections as a full profile,
/// so each address field checks the site-address section first and then the
/// candidate itself.
#[must_use]
pub fn summarize_candidate(raw: &Value) -> CandidateSummary {
    let candidate = locate_profile(raw).unwrap_or(raw);
    let either = |section: FieldRule| {
        section
            .resolve(candidate)
            .or_else(|| FieldRule::new(Scope::Profile, section.candidates).resolve(candidate))
    };

    CandidateSummary {
        street_address: either(STREET),
        unit: either(UNIT),
        city: either(CITY),
        state: either(STATE),
        zip: split_zip(either(ZIP)).0,
        parcel_number: PARCEL_NUMBER.resolve(candidate),
        fips: FIPS.resolve(candidate),
        owner_name: full_name(candidate, OWNER_FULL, OWNER_FIRST, OWNER_LAST)
            .or_else(|| FieldRule::new(Scope::Profile, OWNER_NAMES).resolve(candidate)),
    }
}

/// Renders a JSON scalar as trimmed text.
///
/// Strings are trimmed and numbers printed; empty strings, null, booleans,
/// arrays and objects count as absent.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_owned),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Object field lookup: exact name first, then an ASCII case-insensitive match.
fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_object().and_then(|obj| get_field(obj, name))
}

fn get_field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).or_else(|| {
        obj.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

fn first_present(obj: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|name| get_field(obj, name).and_then(scalar_text))
}

/// Splits a ZIP into its five-digit part and any `+4` suffix.
///
/// Anything longer than five characters is truncated to the first five.
fn split_zip(raw: Option<String>) -> (Option<String>, Option<String>) {
    let Some(raw) = raw else {
        return (None, None);
    };
    if raw.chars().count() <= 5 {
        return (Some(raw), None);
    }
    let zip: String = raw.chars().take(5).collect();
    let rest: String = raw
        .chars()
        .skip(5)
        .skip_while(|c| *c == '-' || c.is_whitespace())
        .collect();
    let suffix = Some(rest).filter(|s| s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()));
    (Some(zip), suffix)
}

/// Uses the full-name field when present, otherwise joins first and last with
/// a single space.
fn full_name(profile: &Value, full: FieldRule, first: FieldRule, last: FieldRule) -> Option<String> {
    full.resolve(profile).or_else(|| {
        let parts: Vec<String> = [first.resolve(profile), last.resolve(profile)]
            .into_iter()
            .flatten()
            .collect();
        Some(parts.join(" ")).filter(|s| !s.is_empty())
    })
}

/// Parses a monetary amount such as `"$1,234,500"` or `"412000.00"`.
fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|e| tracing::debug!(raw, error = %e, "skipping unparseable amount"))
        .ok()
}

/// Parses a four-digit year; zero and non-numeric values are absent.
fn parse_year(raw: &str) -> Option<u16> {
    raw.split('.')
        .next()
        .and_then(|whole| whole.parse::<u16>().ok())
        .filter(|year| *year > 0)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
