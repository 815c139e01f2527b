//! Error types for the external call lifecycle.
//!
//! # Design
//! `CallError` is what a call record captures when it enters the error
//! branch. Construction, transport and parsing failures all land there and
//! the orchestrator treats them alike. `ErrorHandlerError` is the one kind
//! that escapes to the caller: it means the error handler itself failed, and
//! there is no fallback for that.

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};
use crate::state::CallState;

/// A call record mutator was used outside its prerequisite state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {operation} while the call is in state {state}")]
pub struct IllegalStateError {
    pub operation: &'static str,
    pub state: CallState,
}

/// Failure reported by a `Transport`.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection, DNS or I/O failure before a response was read.
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// The server answered with a status the transport treats as an error.
    /// Both wire objects are kept so the call record can backfill them.
    #[error("HTTP {} {}", .response.status, .response.reason_phrase())]
    Status {
        request: HttpRequest,
        response: HttpResponse,
    },
}

/// The error captured on a call record when it enters the error branch.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    /// The request factory could not build a request.
    #[error("failed to create request: {0}")]
    Construction(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response handler could not turn the response into a result.
    #[error("failed to handle response: {0}")]
    Parsing(String),

    #[error(transparent)]
    IllegalState(#[from] IllegalStateError),
}

impl CallError {
    /// Request carried by the error itself, if any.
    pub fn embedded_request(&self) -> Option<&HttpRequest> {
        match self {
            CallError::Transport(TransportError::Status { request, .. }) => Some(request),
            _ => None,
        }
    }

    /// Response carried by the error itself, if any.
    pub fn embedded_response(&self) -> Option<&HttpResponse> {
        match self {
            CallError::Transport(TransportError::Status { response, .. }) => Some(response),
            _ => None,
        }
    }
}

/// An error wrapped together with the call's state and wire objects.
///
/// Produced by `ThrowOnError` so a rethrown failure still says where the
/// call was and what it talked to.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ErrorWithCall {
    message: String,
    pub state: CallState,
    pub request: Option<HttpRequest>,
    pub response: Option<HttpResponse>,
    #[source]
    pub source: Option<CallError>,
}

impl ErrorWithCall {
    pub fn new(
        source: Option<CallError>,
        state: CallState,
        request: Option<HttpRequest>,
        response: Option<HttpResponse>,
    ) -> Self {
        let cause = source
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "Unknown error".to_string());
        let mut message = format!(
            "A problem occurred when calling an external API: \"{cause}\" state: {state}"
        );
        if let Some(request) = &request {
            message.push_str(&format!(", request: {}", request.path));
        }
        if let Some(response) = &response {
            message.push_str(&format!(
                ", response: {} {}",
                response.status,
                response.reason_phrase()
            ));
        }
        Self {
            message,
            state,
            request,
            response,
            source,
        }
    }
}

/// The error handler itself failed. Always propagated to the caller.
#[derive(Debug, Error)]
pub enum ErrorHandlerError {
    #[error(transparent)]
    Call(#[from] ErrorWithCall),

    #[error("error handler failed: {0}")]
    Failed(String),
}
