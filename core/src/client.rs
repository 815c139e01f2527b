//! Drives a single external call through its lifecycle.
//!
//! # Design
//! `ExternalClient` holds its collaborators and nothing else, so one client
//! can serve any number of calls, including from several threads at once.
//! Each entry point only differs in how the request is built; everything
//! after that runs through `run_call`:
//!
//! 1. register the request on the call,
//! 2. send it over the transport,
//! 3. register the response and let the response handler parse it,
//! 4. register and return the result.
//!
//! Any failure along the way (building, sending, parsing) moves the call into
//! the error branch, where the error handler supplies a fallback value. If
//! the error handler itself fails, that error goes to the caller. The log
//! handler runs exactly once, after all of this, on every path.

use std::sync::Arc;

use crate::call::ExternalCall;
use crate::contracts::{ErrorHandler, LogHandler, RequestFactory, ResponseHandler, Transport};
use crate::error::{CallError, ErrorHandlerError};
use crate::http::{HttpMethod, HttpRequest};
use crate::state::CallState;

/// What a call hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<O, E> {
    /// The response was received and parsed.
    Response(O),
    /// The call failed and the error handler supplied this fallback.
    ErrorResponse(E),
}

impl<O, E> Outcome<O, E> {
    pub fn is_response(&self) -> bool {
        matches!(self, Outcome::Response(_))
    }

    pub fn response(self) -> Option<O> {
        match self {
            Outcome::Response(result) => Some(result),
            Outcome::ErrorResponse(_) => None,
        }
    }

    pub fn error_response(self) -> Option<E> {
        match self {
            Outcome::Response(_) => None,
            Outcome::ErrorResponse(fallback) => Some(fallback),
        }
    }

    pub fn into_result(self) -> Result<O, E> {
        match self {
            Outcome::Response(result) => Ok(result),
            Outcome::ErrorResponse(fallback) => Err(fallback),
        }
    }
}

/// Makes calls to an external API with a fixed set of collaborators.
pub struct ExternalClient<I, O, E> {
    request_factory: Arc<dyn RequestFactory<I, O, E> + Send + Sync>,
    transport: Arc<dyn Transport + Send + Sync>,
    response_handler: Arc<dyn ResponseHandler<I, O, E> + Send + Sync>,
    error_handler: Arc<dyn ErrorHandler<I, O, E> + Send + Sync>,
    log_handler: Arc<dyn LogHandler<I, O, E> + Send + Sync>,
    mocked: bool,
}

impl<I, O, E> Clone for ExternalClient<I, O, E> {
    fn clone(&self) -> Self {
        Self {
            request_factory: Arc::clone(&self.request_factory),
            transport: Arc::clone(&self.transport),
            response_handler: Arc::clone(&self.response_handler),
            error_handler: Arc::clone(&self.error_handler),
            log_handler: Arc::clone(&self.log_handler),
            mocked: self.mocked,
        }
    }
}

impl<I, O, E> ExternalClient<I, O, E>
where
    O: Clone,
    E: Clone,
{
    pub fn new(
        request_factory: impl RequestFactory<I, O, E> + Send + Sync + 'static,
        transport: impl Transport + Send + Sync + 'static,
        response_handler: impl ResponseHandler<I, O, E> + Send + Sync + 'static,
        error_handler: impl ErrorHandler<I, O, E> + Send + Sync + 'static,
        log_handler: impl LogHandler<I, O, E> + Send + Sync + 'static,
    ) -> Self {
        Self {
            request_factory: Arc::new(request_factory),
            transport: Arc::new(transport),
            response_handler: Arc::new(response_handler),
            error_handler: Arc::new(error_handler),
            log_handler: Arc::new(log_handler),
            mocked: false,
        }
    }

    /// Mark every call made by this client as going to a test double.
    ///
    /// Only the log annotation changes; the protocol runs the same.
    pub fn with_mocked(mut self, mocked: bool) -> Self {
        self.mocked = mocked;
        self
    }

    pub fn is_mocked(&self) -> bool {
        self.mocked
    }

    /// POST `input` and return the parsed response or the error fallback.
    pub fn post(
        &self,
        call: &mut ExternalCall<I, O, E>,
        input: I,
    ) -> Result<Outcome<O, E>, ErrorHandlerError> {
        let request = self.request_factory.create_post_request(call, &input);
        self.run_call(call, request, Some(input))
    }

    /// PATCH `input`. The request factory builds a PUT and the method is
    /// switched to PATCH before sending.
    pub fn patch(
        &self,
        call: &mut ExternalCall<I, O, E>,
        input: I,
    ) -> Result<Outcome<O, E>, ErrorHandlerError> {
        let request = self
            .request_factory
            .create_put_request(call, &input)
            .map(|request| request.with_method(HttpMethod::Patch));
        self.run_call(call, request, Some(input))
    }

    pub fn get(
        &self,
        call: &mut ExternalCall<I, O, E>,
    ) -> Result<Outcome<O, E>, ErrorHandlerError> {
        let request = self.request_factory.create_get_request(call);
        self.run_call(call, request, None)
    }

    fn run_call(
        &self,
        call: &mut ExternalCall<I, O, E>,
        request: Result<HttpRequest, CallError>,
        mut input: Option<I>,
    ) -> Result<Outcome<O, E>, ErrorHandlerError> {
        let (outcome, error_state) = match self.execute(call, request, &mut input) {
            Ok(result) => (Ok(Outcome::Response(result)), None),
            Err(error) => match self.recover(call, error, input) {
                Ok(fallback) => (Ok(Outcome::ErrorResponse(fallback)), None),
                Err((error, last_known_state)) => (Err(error), Some(last_known_state)),
            },
        };

        self.log_handler.log_request(call, error_state);
        outcome
    }

    /// Request, send, parse. `input` is moved onto the call only when the
    /// request can be registered; otherwise it stays with the caller for the
    /// error branch.
    fn execute(
        &self,
        call: &mut ExternalCall<I, O, E>,
        request: Result<HttpRequest, CallError>,
        input: &mut Option<I>,
    ) -> Result<O, CallError> {
        let request = request?;
        let input = match call.state() {
            CallState::CreateRequest => input.take(),
            _ => None,
        };
        call.set_request(request.clone(), self.mocked, input)?;

        let response = self.transport.send(&request)?;
        call.set_response(response)?;

        let result = self.response_handler.handle_response(call)?;
        call.set_result(result.clone())?;
        Ok(result)
    }

    /// Error branch. On failure, also returns the state the call was in
    /// before it entered the branch.
    fn recover(
        &self,
        call: &mut ExternalCall<I, O, E>,
        error: CallError,
        input: Option<I>,
    ) -> Result<E, (ErrorHandlerError, CallState)> {
        let last_known_state = call.enter_error_branch(error, input);

        let fallback = self
            .error_handler
            .handle_error(call)
            .map_err(|err| (err, last_known_state))?;
        // enter_error_branch always leaves HANDLE_ERROR_RESPONSE.
        let registered = call.set_error_result(fallback.clone()).is_ok();
        debug_assert!(registered, "fallback registered outside the error branch");
        Ok(fallback)
    }
}
