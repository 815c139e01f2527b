//! Collaborator traits consumed by `ExternalClient`.
//!
//! Every collaborator receives the call record by shared reference. Only the
//! client advances the record, through its own mutators.

use crate::call::ExternalCall;
use crate::error::{CallError, ErrorHandlerError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::state::CallState;

/// Builds wire requests from a call and its input.
///
/// Implementations return the request; they never register it on the call.
pub trait RequestFactory<I, O, E> {
    fn create_post_request(
        &self,
        call: &ExternalCall<I, O, E>,
        input: &I,
    ) -> Result<HttpRequest, CallError>;

    /// The client turns this into a PATCH for `ExternalClient::patch`.
    fn create_put_request(
        &self,
        call: &ExternalCall<I, O, E>,
        input: &I,
    ) -> Result<HttpRequest, CallError>;

    fn create_get_request(&self, call: &ExternalCall<I, O, E>) -> Result<HttpRequest, CallError>;
}

/// Turns a received response into the call's success value.
///
/// Called once the call has both a request and a response.
pub trait ResponseHandler<I, O, E> {
    fn handle_response(&self, call: &ExternalCall<I, O, E>) -> Result<O, CallError>;
}

/// Produces the value returned to the caller when a call fails.
///
/// Called once the call has captured its error. An `Err` here is fatal and
/// reaches the caller unchanged.
pub trait ErrorHandler<I, O, E> {
    fn handle_error(&self, call: &ExternalCall<I, O, E>) -> Result<E, ErrorHandlerError>;
}

/// Records a finished call. Invoked exactly once per call.
///
/// `error_state` is only `Some` when the error handler failed, and then holds
/// the state the call was in before the original failure.
pub trait LogHandler<I, O, E> {
    fn log_request(&self, call: &ExternalCall<I, O, E>, error_state: Option<CallState>);
}

/// Sends a wire request and returns the wire response.
///
/// The request is borrowed: headers the transport adds on the way out never
/// show up on the call record.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
