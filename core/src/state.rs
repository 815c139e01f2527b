//! Lifecycle states of a single external call.
//!
//! # Design
//! The happy path is a straight line through four states. Failure can branch
//! off from any of the first three into the two error states, and there is no
//! edge back. `next_state` encodes only the forward edges; entering the error
//! branch is a separate, unconditional jump owned by `ExternalCall`.
//!
//! ```text
//! CREATE_REQUEST -> HTTP_REQUEST -> HANDLE_RESPONSE -> RETURN_RESPONSE
//!       \               |                |
//!        +--------------+----------------+-> HANDLE_ERROR_RESPONSE -> RETURN_ERROR_RESPONSE
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a call currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallState {
    /// Building the wire request from the caller's input.
    CreateRequest,
    /// The request is registered and is being sent over the transport.
    HttpRequest,
    /// A response arrived and is being parsed into a result.
    HandleResponse,
    /// The parsed result is ready to be returned. Terminal.
    ReturnResponse,
    /// Something failed and the error handler is producing a fallback.
    HandleErrorResponse,
    /// The fallback value is ready to be returned. Terminal.
    ReturnErrorResponse,
}

impl CallState {
    /// The state that follows this one on its own branch.
    ///
    /// States without a forward edge (both terminals) map to themselves.
    pub fn next_state(self) -> Self {
        match self {
            Self::CreateRequest => Self::HttpRequest,
            Self::HttpRequest => Self::HandleResponse,
            Self::HandleResponse => Self::ReturnResponse,
            Self::HandleErrorResponse => Self::ReturnErrorResponse,
            Self::ReturnResponse | Self::ReturnErrorResponse => self,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ReturnResponse | Self::ReturnErrorResponse)
    }

    pub fn is_error_branch(self) -> bool {
        matches!(self, Self::HandleErrorResponse | Self::ReturnErrorResponse)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateRequest => "CREATE_REQUEST",
            Self::HttpRequest => "HTTP_REQUEST",
            Self::HandleResponse => "HANDLE_RESPONSE",
            Self::ReturnResponse => "RETURN_RESPONSE",
            Self::HandleErrorResponse => "HANDLE_ERROR_RESPONSE",
            Self::ReturnErrorResponse => "RETURN_ERROR_RESPONSE",
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
