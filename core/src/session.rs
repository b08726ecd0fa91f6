//! Authenticated Traffic Ops session and the bind-and-call dispatch path.
//!
//! # Design
//! `Session` owns the connection configuration, an optional transport, and
//! the logged-in flag. Every endpoint call funnels through [`Session::call`]:
//! resolve the API version and URL template (failing before any I/O on a
//! configuration mistake), dispatch over the transport, then classify the
//! response — operation error with alert messages on a non-2xx, decode error
//! on unparseable JSON, otherwise the payload with the Traffic Ops
//! `"response"` envelope key unwrapped.
//!
//! The session is built for one logical caller at a time; nothing here locks.

use serde_json::Value;

use crate::api::USER_LOGIN;
use crate::endpoint::{encode_query, ApiVersion, Endpoint, PathArgs};
use crate::error::{ConfigError, Error, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{alert_messages, LoginCredentials};

/// Result of one normalized endpoint call: the decoded payload and the raw
/// transport response it came from.
pub type ApiResult = Result<(Value, HttpResponse), Error>;

/// Headers sent with every request unless overridden in [`SessionConfig`].
pub fn default_headers() -> Vec<(String, String)> {
    vec![(
        "Content-Type".to_string(),
        "application/json; charset=UTF-8".to_string(),
    )]
}

/// Connection parameters for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    /// Negotiated default API version, used when a call does not select one.
    pub api_version: ApiVersion,
    /// TLS certificate verification toggle. Only ever disabled explicitly.
    pub verify_cert: bool,
    pub headers: Vec<(String, String)>,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 443,
            use_ssl: true,
            api_version: ApiVersion::V1_3,
            verify_cert: true,
            headers: default_headers(),
        }
    }
}

/// A session against one Traffic Ops host.
///
/// Call [`Session::login`] before any other endpoint; every other operation
/// fails with a configuration error until login succeeds.
pub struct Session {
    config: SessionConfig,
    transport: Option<Box<dyn Transport>>,
    logged_in: bool,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            transport: None,
            logged_in: false,
        }
    }

    /// Build a session over a caller-supplied transport. Used by tests to
    /// inject stubs; the transport counts as already open.
    pub fn with_transport(config: SessionConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            config,
            transport: Some(transport),
            logged_in: false,
        }
    }

    /// `<scheme>://<host>:<port>`, without the API prefix.
    pub fn server_url(&self) -> String {
        let scheme = if self.config.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.config.host, self.config.port)
    }

    /// `<server url>/api/<version>/` for the session's default version.
    pub fn base_url(&self) -> String {
        format!("{}/api/{}/", self.server_url(), self.config.api_version)
    }

    pub fn api_version(&self) -> ApiVersion {
        self.config.api_version
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    pub fn logged_in(&self) -> bool {
        self.is_open() && self.logged_in
    }

    /// Install the ureq transport if none is present. Idempotent.
    pub fn open(&mut self) {
        if self.transport.is_none() {
            self.transport = Some(Box::new(UreqTransport::new(self.config.verify_cert)));
        }
    }

    /// Drop the transport and the logged-in state. Idempotent.
    pub fn close(&mut self) {
        self.transport = None;
        self.logged_in = false;
    }

    /// Log in to the Traffic Ops API.
    ///
    /// On return the session is in exactly one of two states: logged in, or
    /// closed and not logged in. A TLS failure produces a login error whose
    /// message suggests the `verify_cert` toggle; verification is never
    /// disabled automatically.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), Error> {
        tracing::info!(url = %self.server_url(), "connecting to traffic ops");
        if !self.is_open() {
            self.open();
        }
        tracing::info!("connected, authenticating");

        self.logged_in = false;
        let credentials = LoginCredentials {
            u: username.to_string(),
            p: password.to_string(),
        };
        let body = serde_json::to_value(&credentials)
            .map_err(|e| Error::Decode(e.to_string()))?;

        match self.call(&USER_LOGIN, None, &PathArgs::new(), &[], Some(body), false) {
            Ok(_) => {
                self.logged_in = true;
                tracing::info!("authenticated");
                Ok(())
            }
            Err(Error::Transport(TransportError::Tls(message))) => {
                self.close();
                tracing::error!(%message, "TLS failure during login");
                Err(Error::Login(format!(
                    "{message}. This host may use a self-signed certificate; \
                     consider constructing the session with verify_cert = false. \
                     Disabling certificate verification is not recommended."
                )))
            }
            Err(Error::Operation { status, messages }) => {
                self.close();
                let detail = messages.join("; ");
                tracing::error!(status, %detail, "login rejected");
                Err(Error::Login(format!(
                    "logging in failed with status {status}: {detail}"
                )))
            }
            Err(other) => {
                self.close();
                tracing::error!(error = %other, "login aborted");
                Err(other)
            }
        }
    }

    /// Bind and call `endpoint` at the session's default API version.
    pub fn request(
        &self,
        endpoint: &Endpoint,
        args: &PathArgs,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> ApiResult {
        self.request_with_version(endpoint, None, args, query, body)
    }

    /// Bind and call `endpoint`, optionally selecting an API version. The
    /// version must be in the endpoint's supported set either way.
    pub fn request_with_version(
        &self,
        endpoint: &Endpoint,
        version: Option<ApiVersion>,
        args: &PathArgs,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> ApiResult {
        self.call(endpoint, version, args, query, body, true)
    }

    /// Fetch every page of a paged collection endpoint.
    ///
    /// Issues `page = 1, 2, 3, …` at the fixed `limit`, strictly
    /// sequentially, and stops on the first page that comes back empty. A
    /// short non-empty page does not terminate the loop — this mirrors the
    /// server contract the client was written against and is a known
    /// limitation, not an optimization opportunity. Only the final page's
    /// raw response is returned; earlier ones are discarded. Any page error
    /// aborts the whole fetch and discards accumulated items.
    pub fn get_all_pages(
        &self,
        endpoint: &Endpoint,
        args: &PathArgs,
        query: &[(String, String)],
        limit: u64,
    ) -> Result<(Vec<Value>, HttpResponse), Error> {
        let mut items = Vec::new();
        let mut page: u64 = 1;
        loop {
            let mut page_query: Vec<(String, String)> = query.to_vec();
            page_query.push(("limit".to_string(), limit.to_string()));
            page_query.push(("page".to_string(), page.to_string()));

            let (payload, response) = self.request(endpoint, args, &page_query, None)?;
            let page_items = match payload {
                Value::Array(values) => values,
                Value::Null => Vec::new(),
                other => {
                    return Err(Error::Decode(format!(
                        "expected a JSON array page, got: {other}"
                    )))
                }
            };

            if page_items.is_empty() {
                tracing::debug!(pages = page, total = items.len(), "pagination complete");
                return Ok((items, response));
            }
            items.extend(page_items);
            page += 1;
        }
    }

    fn call(
        &self,
        endpoint: &Endpoint,
        version: Option<ApiVersion>,
        args: &PathArgs,
        query: &[(String, String)],
        body: Option<Value>,
        require_login: bool,
    ) -> ApiResult {
        // All validation happens before the transport is touched.
        if require_login && !self.logged_in() {
            return Err(ConfigError::NotLoggedIn.into());
        }
        let version = endpoint.resolve_version(version, self.config.api_version)?;
        let path = endpoint.resolve_path(args)?;

        let mut url = format!("{}/api/{}/{}", self.server_url(), version, path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&encode_query(query));
        }

        let transport = self
            .transport
            .as_deref()
            .ok_or(ConfigError::NotLoggedIn)?;

        let request = HttpRequest {
            method: endpoint.method,
            url,
            headers: self.config.headers.clone(),
            body: body.map(|value| value.to_string()),
        };
        tracing::debug!(method = request.method.as_str(), url = %request.url, "dispatching");

        let response = transport.execute(&request)?;
        if !response.is_success() {
            return Err(Error::Operation {
                status: response.status,
                messages: alert_messages(&response.body),
            });
        }

        let payload = normalize_payload(&response.body)?;
        Ok((payload, response))
    }
}

/// Decode a success body and unwrap the Traffic Ops `"response"` envelope
/// key when present. The unwrapped value's shape — object or array — is
/// preserved exactly as received.
fn normalize_payload(body: &str) -> Result<Value, Error> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    let decoded: Value =
        serde_json::from_str(body).map_err(|e| Error::Decode(e.to_string()))?;
    Ok(match decoded {
        Value::Object(mut map) => match map.remove("response") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    })
}
