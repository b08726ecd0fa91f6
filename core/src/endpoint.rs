//! Endpoint descriptors and URL template resolution.
//!
//! # Design
//! Every API operation is described by a static [`Endpoint`]: an HTTP method,
//! a URL template with named placeholders, and the set of API versions the
//! operation exists in. One generic resolution path does the version check,
//! the placeholder substitution and the query-string encoding for all of
//! them, so adding an operation is a pure-data change (one descriptor entry),
//! not new request-building code.
//!
//! Template placeholders are written `{name}` for strings or `{name:d}` for
//! decimal integers. All validation happens here, before any network I/O.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::ConfigError;
use crate::http::HttpMethod;

/// Characters kept verbatim in query-string keys and values, per RFC 3986
/// unreserved characters. Everything else is percent-encoded.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A Traffic Ops API version, as it appears in the `api/<version>/` URL
/// prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1_1,
    V1_2,
    V1_3,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1_1 => "1.1",
            ApiVersion::V1_2 => "1.2",
            ApiVersion::V1_3 => "1.3",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static descriptor for one API operation.
///
/// Immutable, defined once per operation in [`crate::api`]. The placeholder
/// set of `template` is exactly the set of `{name}` / `{name:d}` tokens it
/// contains; every one must be supplied at call time.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub template: &'static str,
    pub versions: &'static [ApiVersion],
}

impl Endpoint {
    /// Pick the API version for a call: the caller-selected one if given,
    /// otherwise `default` (the session's negotiated version). Either way the
    /// result must be in this endpoint's supported set — no silent downgrade.
    pub fn resolve_version(
        &self,
        requested: Option<ApiVersion>,
        default: ApiVersion,
    ) -> Result<ApiVersion, ConfigError> {
        let version = requested.unwrap_or(default);
        if self.versions.contains(&version) {
            Ok(version)
        } else {
            Err(ConfigError::UnsupportedVersion {
                requested: version,
                supported: self
                    .versions
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        }
    }

    /// Substitute every placeholder in this endpoint's template.
    pub fn resolve_path(&self, args: &PathArgs) -> Result<String, ConfigError> {
        substitute_template(self.template, args)
    }
}

/// A value supplied for a URL placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValue {
    Int(i64),
    Str(String),
}

impl From<i64> for PathValue {
    fn from(value: i64) -> Self {
        PathValue::Int(value)
    }
}

impl From<i32> for PathValue {
    fn from(value: i32) -> Self {
        PathValue::Int(i64::from(value))
    }
}

impl From<&str> for PathValue {
    fn from(value: &str) -> Self {
        PathValue::Str(value.to_string())
    }
}

impl From<String> for PathValue {
    fn from(value: String) -> Self {
        PathValue::Str(value)
    }
}

/// Named placeholder values for one call. Discarded after dispatch.
///
/// Values supplied for names the template does not mention are ignored.
#[derive(Debug, Clone, Default)]
pub struct PathArgs(Vec<(String, PathValue)>);

impl PathArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<PathValue>) -> Self {
        self.0.push((name.to_string(), value.into()));
        self
    }

    fn get(&self, name: &str) -> Option<&PathValue> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// Substitute `{name}` / `{name:d}` tokens in `template` from `args`.
///
/// `:d` tokens require a decimal integer: an `Int` value renders directly,
/// a `Str` value must parse as `i64`. A missing placeholder or a failed
/// coercion is a [`ConfigError`], reported before any I/O happens.
pub fn substitute_template(template: &str, args: &PathArgs) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| ConfigError::MissingPlaceholder {
            name: after.to_string(),
        })?;
        let token = &after[..close];
        let (name, spec) = match token.split_once(':') {
            Some((name, spec)) => (name, Some(spec)),
            None => (token, None),
        };

        let value = args
            .get(name)
            .ok_or_else(|| ConfigError::MissingPlaceholder {
                name: name.to_string(),
            })?;
        out.push_str(&render_value(name, value, spec)?);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn render_value(
    name: &str,
    value: &PathValue,
    spec: Option<&str>,
) -> Result<String, ConfigError> {
    match (spec, value) {
        (Some("d"), PathValue::Int(i)) => Ok(i.to_string()),
        (Some("d"), PathValue::Str(s)) => match s.parse::<i64>() {
            Ok(i) => Ok(i.to_string()),
            Err(_) => Err(ConfigError::PlaceholderType {
                name: name.to_string(),
                value: s.clone(),
            }),
        },
        (None, PathValue::Int(i)) => Ok(i.to_string()),
        (None, PathValue::Str(s)) => Ok(s.clone()),
        (Some(other), _) => Err(ConfigError::PlaceholderType {
            name: name.to_string(),
            value: format!("unknown type spec `{other}`"),
        }),
    }
}

/// Encode `params` as a URL query string (without the leading `?`).
///
/// Pair order is kept as given; the server treats query parameters as
/// order-insensitive.
pub fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_ENCODE_SET),
                utf8_percent_encode(value, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_without_placeholders_passes_through() {
        let path = substitute_template("cdns", &PathArgs::new()).unwrap();
        assert_eq!(path, "cdns");
    }

    #[test]
    fn string_placeholder_substitutes() {
        let args = PathArgs::new().set("xml_id", "my-ds");
        let path = substitute_template("deliveryservices/xmlId/{xml_id}/sslkeys", &args).unwrap();
        assert_eq!(path, "deliveryservices/xmlId/my-ds/sslkeys");
    }

    #[test]
    fn typed_placeholder_accepts_int() {
        let args = PathArgs::new().set("cdn_id", 42);
        let path = substitute_template("cdns/{cdn_id:d}/queue_update", &args).unwrap();
        assert_eq!(path, "cdns/42/queue_update");
    }

    #[test]
    fn typed_placeholder_coerces_numeric_string() {
        let args = PathArgs::new().set("cdn_id", "42");
        let path = substitute_template("cdns/{cdn_id:d}", &args).unwrap();
        assert_eq!(path, "cdns/42");
    }

    #[test]
    fn typed_placeholder_rejects_non_numeric_string() {
        let args = PathArgs::new().set("cdn_id", "fourty-two");
        let err = substitute_template("cdns/{cdn_id:d}", &args).unwrap_err();
        assert!(matches!(err, ConfigError::PlaceholderType { name, .. } if name == "cdn_id"));
    }

    #[test]
    fn missing_placeholder_is_reported_by_name() {
        let err = substitute_template("cdns/{cdn_id:d}", &PathArgs::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPlaceholder { name } if name == "cdn_id"));
    }

    #[test]
    fn surplus_args_are_ignored() {
        let args = PathArgs::new().set("cdn_id", 1).set("unused", "x");
        let path = substitute_template("cdns/{cdn_id:d}", &args).unwrap();
        assert_eq!(path, "cdns/1");
    }

    #[test]
    fn untyped_placeholder_accepts_int() {
        let args = PathArgs::new().set("id", 7);
        let path = substitute_template("api_capabilities/{id}", &args).unwrap();
        assert_eq!(path, "api_capabilities/7");
    }

    #[test]
    fn resolve_version_prefers_caller_selection() {
        let endpoint = Endpoint {
            method: crate::http::HttpMethod::Get,
            template: "cdns",
            versions: &[ApiVersion::V1_1, ApiVersion::V1_2],
        };
        let version = endpoint
            .resolve_version(Some(ApiVersion::V1_1), ApiVersion::V1_2)
            .unwrap();
        assert_eq!(version, ApiVersion::V1_1);
    }

    #[test]
    fn resolve_version_rejects_unsupported() {
        let endpoint = Endpoint {
            method: crate::http::HttpMethod::Get,
            template: "cdns",
            versions: &[ApiVersion::V1_1, ApiVersion::V1_2],
        };
        let err = endpoint
            .resolve_version(Some(ApiVersion::V1_3), ApiVersion::V1_2)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedVersion {
                requested: ApiVersion::V1_3,
                ..
            }
        ));
    }

    #[test]
    fn resolve_version_validates_session_default_too() {
        let endpoint = Endpoint {
            method: crate::http::HttpMethod::Get,
            template: "api_capabilities",
            versions: &[ApiVersion::V1_2, ApiVersion::V1_3],
        };
        let err = endpoint
            .resolve_version(None, ApiVersion::V1_1)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { .. }));
    }

    #[test]
    fn encode_query_percent_encodes_values() {
        let params = vec![
            ("useInTable".to_string(), "servers".to_string()),
            ("name".to_string(), "a b&c".to_string()),
        ];
        assert_eq!(encode_query(&params), "useInTable=servers&name=a%20b%26c");
    }

    #[test]
    fn encode_query_keeps_unreserved_characters() {
        let params = vec![("q".to_string(), "a-b_c.d~e".to_string())];
        assert_eq!(encode_query(&params), "q=a-b_c.d~e");
    }
}
