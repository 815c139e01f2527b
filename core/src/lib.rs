//! Structured lifecycle for single calls to an external HTTP API.
//!
//! # Overview
//! An `ExternalCall` records one call: what was asked, what was sent, what
//! came back and where in its lifecycle it is. An `ExternalClient` drives
//! that record through a fixed protocol using pluggable collaborators:
//!
//! - a `RequestFactory` builds the wire request,
//! - a `Transport` sends it,
//! - a `ResponseHandler` parses the response,
//! - an `ErrorHandler` turns any failure into a fallback value,
//! - a `LogHandler` sees every finished call exactly once.
//!
//! # Design
//! - The call record owns the state machine. Its mutators check their
//!   prerequisite state and return `IllegalStateError` on misuse.
//! - Collaborators only ever see `&ExternalCall`.
//! - `ExternalClient` is stateless apart from its collaborators, so it can be
//!   cloned and shared freely. Each call gets its own record.
//! - JSON collaborators, stock handlers and a `ureq` transport ship with the
//!   crate; the core protocol does not depend on them.

pub mod call;
pub mod client;
pub mod contracts;
pub mod error;
pub mod handlers;
pub mod http;
pub mod json;
pub mod state;
pub mod telemetry;
pub mod transport;

pub use call::ExternalCall;
pub use client::{ExternalClient, Outcome};
pub use contracts::{ErrorHandler, LogHandler, RequestFactory, ResponseHandler, Transport};
pub use error::{CallError, ErrorHandlerError, ErrorWithCall, IllegalStateError, TransportError};
pub use handlers::{DefaultOnError, ThrowOnError, TracingLogHandler};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use json::{JsonRequestFactory, JsonResponseHandler};
pub use state::CallState;
pub use transport::{ConfigError, TransportConfig, UreqTransport};
