//! Error taxonomy for the Traffic Ops client.
//!
//! # Design
//! Four disjoint kinds, so callers can match on what actually went wrong:
//! configuration mistakes caught before any I/O, transport failures below the
//! HTTP layer, operation failures reported by the server with a status and
//! alert messages, and decode failures where a success response carried a
//! body that is not JSON. Login gets its own variant because "could not log
//! in" is a different situation than "logged in but a later call failed".
//!
//! Nothing here retries; every error is classified once and returned.

use thiserror::Error;

use crate::endpoint::ApiVersion;

/// Caller or programmer mistakes detected before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The requested API version is not in the endpoint's supported set.
    #[error("API version {requested} is not supported by this endpoint (supported: {supported})")]
    UnsupportedVersion {
        requested: ApiVersion,
        supported: String,
    },

    /// The URL template names a placeholder the call did not supply.
    #[error("no value supplied for URL placeholder `{name}`")]
    MissingPlaceholder { name: String },

    /// A supplied placeholder value failed coercion to the template's
    /// declared type.
    #[error("placeholder `{name}` expects a decimal integer, got `{value}`")]
    PlaceholderType { name: String, value: String },

    /// An endpoint other than login was called before a successful login.
    #[error("not logged in; call login() first")]
    NotLoggedIn,
}

/// Failures below the HTTP semantic layer. Never retried here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// TLS handshake or certificate verification failure.
    #[error("TLS failure: {0}")]
    Tls(String),

    /// DNS resolution or connection establishment failure.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The transport's configured timeout elapsed.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Socket-level I/O failure mid-exchange.
    #[error("I/O failure: {0}")]
    Io(String),
}

/// Any error produced by a session call.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status. `messages` holds the
    /// human-readable texts extracted from the alerts envelope, if any.
    #[error("server returned status {status}: {}", .messages.join("; "))]
    Operation { status: u16, messages: Vec<String> },

    /// Login specifically failed; the session is closed and not logged in.
    #[error("login failed: {0}")]
    Login(String),

    /// A success-status response carried a body that is not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(String),
}
