//! Wire types and typed DTOs for the Traffic Ops API.
//!
//! # Design
//! Payloads come back as dynamic `serde_json::Value` trees, because most of
//! the API surface has no schema the client enforces. Where the schema is
//! well known a typed DTO is provided and [`from_payload`] deserializes the
//! dynamic tree into it. DTOs are defined independently from the mock-server
//! crate; integration tests catch schema drift.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// One entry of the server's alerts envelope:
/// `{"alerts": [{"level": "...", "text": "..."}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct AlertEnvelope {
    #[serde(default)]
    alerts: Vec<Alert>,
}

/// Extract the alert texts from an error response body, if it carries the
/// structured envelope. A body without a parseable envelope yields no
/// messages; the status code alone still identifies the failure.
pub fn alert_messages(body: &str) -> Vec<String> {
    match serde_json::from_str::<AlertEnvelope>(body) {
        Ok(envelope) => envelope.alerts.into_iter().map(|alert| alert.text).collect(),
        Err(_) => Vec::new(),
    }
}

/// Login request body: Traffic Ops expects `{"u": .., "p": ..}`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub u: String,
    pub p: String,
}

/// A CDN as returned by the `cdns` family of endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cdn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub domain_name: String,
    #[serde(default)]
    pub dnssec_enabled: bool,
}

/// A region as returned by the `regions` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub division: i64,
    pub division_name: String,
}

/// One delivery service / server assignment from `deliveryserviceserver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryServiceServer {
    pub delivery_service: i64,
    pub server: i64,
}

/// Deserialize a dynamic payload into a typed DTO.
pub fn from_payload<T: DeserializeOwned>(payload: Value) -> Result<T, Error> {
    serde_json::from_value(payload).map_err(|e| Error::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_messages_from_envelope() {
        let body = r#"{"alerts":[{"level":"error","text":"not found"}]}"#;
        assert_eq!(alert_messages(body), vec!["not found".to_string()]);
    }

    #[test]
    fn alert_messages_collects_all_entries() {
        let body = r#"{"alerts":[
            {"level":"error","text":"no such cdn"},
            {"level":"warning","text":"deprecated endpoint"}
        ]}"#;
        assert_eq!(
            alert_messages(body),
            vec!["no such cdn".to_string(), "deprecated endpoint".to_string()]
        );
    }

    #[test]
    fn alert_messages_tolerates_unstructured_bodies() {
        assert!(alert_messages("Internal Server Error").is_empty());
        assert!(alert_messages("{}").is_empty());
    }

    #[test]
    fn login_credentials_serialize_to_short_keys() {
        let creds = LoginCredentials {
            u: "admin".to_string(),
            p: "secret".to_string(),
        };
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json, serde_json::json!({"u": "admin", "p": "secret"}));
    }

    #[test]
    fn cdn_deserializes_from_camel_case() {
        let cdn: Cdn = serde_json::from_str(
            r#"{"id":3,"name":"edge","domainName":"edge.example.com","dnssecEnabled":true}"#,
        )
        .unwrap();
        assert_eq!(cdn.id, Some(3));
        assert_eq!(cdn.domain_name, "edge.example.com");
        assert!(cdn.dnssec_enabled);
    }

    #[test]
    fn cdn_without_id_serializes_without_id_key() {
        let cdn = Cdn {
            id: None,
            name: "edge".to_string(),
            domain_name: "edge.example.com".to_string(),
            dnssec_enabled: false,
        };
        let json = serde_json::to_value(&cdn).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["domainName"], "edge.example.com");
    }

    #[test]
    fn region_deserializes_from_camel_case() {
        let region: Region = serde_json::from_str(
            r#"{"id":2,"name":"us-west","division":1,"divisionName":"west"}"#,
        )
        .unwrap();
        assert_eq!(region.id, Some(2));
        assert_eq!(region.division_name, "west");
    }

    #[test]
    fn from_payload_reports_decode_errors() {
        let payload = serde_json::json!({"name": 7});
        let err = from_payload::<Cdn>(payload).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
