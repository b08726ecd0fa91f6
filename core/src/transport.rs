//! Blocking transport abstraction and the ureq-backed implementation.
//!
//! # Design
//! The session dispatches every resolved request through a [`Transport`].
//! Production use goes through [`UreqTransport`]; tests inject stubs and
//! spies. The transport carries no retry or caching policy — it executes one
//! request and classifies any failure into a [`TransportError`].

use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// One blocking HTTP round-trip. Non-2xx statuses are data, not errors.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport over a [`ureq::Agent`] with a cookie jar.
///
/// The cookie jar matters: Traffic Ops login answers with a `mojolicious`
/// session cookie that must be replayed on every subsequent call. The agent
/// is configured to hand back 4xx/5xx responses as data so the session can
/// interpret statuses itself.
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Build the agent. When `verify_cert` is false, TLS certificate
    /// verification is disabled — intended for hosts with self-signed
    /// certificates, never enabled implicitly.
    pub fn new(verify_cert: bool) -> Self {
        let tls = TlsConfig::builder()
            .disable_verification(!verify_cert)
            .build();
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .tls_config(tls)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Delete => {
                let mut builder = self.agent.delete(&request.url);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let mut builder = self.agent.put(&request.url);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        }
        .map_err(map_ureq_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Classify a ureq failure into the transport taxonomy. TLS problems get
/// their own kind so login can attach the verify-cert guidance.
fn map_ureq_error(error: ureq::Error) -> TransportError {
    let message = error.to_string();
    match error {
        ureq::Error::Tls(_) => TransportError::Tls(message),
        ureq::Error::Io(_) => TransportError::Io(message),
        ureq::Error::Timeout(_) => TransportError::Timeout(message),
        _ => TransportError::Connect(message),
    }
}
