//! Synchronous client core for the Traffic Ops API.
//!
//! # Overview
//! Maps a table of static endpoint descriptors (HTTP method, URL template
//! with named placeholders, supported API versions) onto one generic
//! bind-and-call path: validate the version, substitute the template, encode
//! the query string, dispatch over an authenticated session, and normalize
//! the JSON response. Adding an endpoint is a pure-data change.
//!
//! # Design
//! - `Session` holds the connection config, the transport, and the logged-in
//!   flag; every call is a single blocking request/response cycle.
//! - All request validation happens before any network I/O; configuration
//!   mistakes never reach the wire.
//! - Payloads are dynamic `serde_json::Value` trees with typed DTOs where
//!   the schema is known; the top-level object-vs-array shape is preserved
//!   exactly as received.
//! - The transport is a trait, so tests run the full dispatch path against
//!   scripted stubs; integration tests catch schema drift against the
//!   mock-server crate.

pub mod api;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;

pub use endpoint::{ApiVersion, Endpoint, PathArgs, PathValue};
pub use error::{ConfigError, Error, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{ApiResult, Session, SessionConfig};
pub use transport::{Transport, UreqTransport};
pub use types::{from_payload, Alert, Cdn, DeliveryServiceServer, LoginCredentials, Region};
