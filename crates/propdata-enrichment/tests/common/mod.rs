//! Shared wiremock fixtures for the enrichment integration tests.

#![allow(dead_code)]

use std::time::Duration;

use propdata_core::Credentials;
use propdata_enrichment::EnrichmentClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const FEED_ID: &str = "feed-7";
pub const CLIENT_REFERENCE: &str = "intake";

pub const TOKEN_PATH: &str = "/oauth2/token";
pub const SEARCH_PATH: &str = "/property/v1/search";

pub fn credentials(base_url: &str) -> Credentials {
    Credentials::new(base_url, CLIENT_ID, CLIENT_SECRET, FEED_ID)
        .with_client_reference(CLIENT_REFERENCE)
        .with_timeout(Duration::from_secs(5))
}

pub fn test_client(server: &MockServer) -> EnrichmentClient {
    EnrichmentClient::from_credentials(credentials(&server.uri()), Duration::from_secs(1800))
        .expect("client construction should not fail")
}

pub fn token_body(token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 3600
    })
}

/// Mounts a token endpoint that hands out `token` and expects `times` calls.
pub async fn mount_token(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
        .expect(times)
        .mount(server)
        .await;
}

pub fn la_verne_single() -> Value {
    json!({
        "MatchCode": "S",
        "PropertyMatch": {
            "Profile": {
                "SiteAddress": {
                    "StreetAddress": "2116 Fulton Rd",
                    "City": "La Verne",
                    "State": "CA",
                    "Zip": "91750-2401"
                },
                "ParcelNum": "8678-012-034",
                "FIPS": "06037",
                "LegalDescription": {
                    "LegalBriefDescription": "TRACT # 28456 LOT 12"
                },
                "OwnerInformation": {
                    "Owner1FirstName": "Jordan",
                    "Owner1LastName": "Reyes"
                },
                "Assessment": {
                    "AssessedValue": "$612,450"
                }
            }
        }
    })
}

/// The documented La Verne lookup: 1358 5th St, La Verne, CA 91750.
pub fn fifth_street_single() -> Value {
    json!({
        "MatchCode": "S",
        "PropertyMatch": {
            "Profile": {
                "SiteAddress": {
                    "StreetAddress": "1358 5th St",
                    "City": "La Verne",
                    "State": "CA",
                    "Zip": "91750"
                },
                "ParcelNum": "8391-018-021",
                "FIPS": "06037",
                "LegalDescription": {
                    "LegalBriefDescription": "LOT 1 BLK 2 TRACT 12345"
                }
            }
        }
    })
}

pub fn la_verne_multi() -> Value {
    json!({
        "MatchCode": "M",
        "Candidates": [
            {
                "StreetAddress": "2116 Fulton Rd",
                "UnitNumber": "A",
                "City": "La Verne",
                "State": "CA",
                "Zip": "91750",
                "APN": "8678-012-034"
            },
            {
                "StreetAddress": "2116 Fulton Rd",
                "UnitNumber": "B",
                "City": "La Verne",
                "State": "CA",
                "Zip": "91750",
                "APN": "8678-012-035"
            }
        ]
    })
}

pub fn no_match() -> Value {
    json!({ "MatchCode": "N" })
}

pub fn search_ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
