//! The per-call record that mediates between the client and its collaborators.
//!
//! # Design
//! `ExternalCall` carries one call attempt's data and its lifecycle state.
//! Only the mutators on this type move the state, and each mutator checks
//! that the call is in its prerequisite state first, returning an
//! `IllegalStateError` otherwise. Collaborators receive `&ExternalCall` and so
//! can read everything but change nothing.
//!
//! A record is single-use: once it reaches a terminal state every
//! state-advancing mutator rejects it.

use crate::error::{CallError, IllegalStateError};
use crate::http::{HttpRequest, HttpResponse};
use crate::state::CallState;

/// One call to an external API.
///
/// `I` is the caller's input, `O` the parsed success result and `E` the
/// fallback value produced when the call fails.
#[derive(Debug, Clone)]
pub struct ExternalCall<I, O, E> {
    identifier: String,
    path: String,
    output_class: Option<String>,
    state: CallState,
    input: Option<I>,
    /// The request as built by the request factory, before the transport
    /// adds its own headers.
    request: Option<HttpRequest>,
    response: Option<HttpResponse>,
    result: Option<O>,
    error_result: Option<E>,
    /// Failure that moved the call into the error branch. A failing error
    /// handler does not overwrite this.
    error: Option<CallError>,
    mocked: bool,
}

impl<I, O, E> ExternalCall<I, O, E> {
    pub fn new(identifier: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            path: path.into(),
            output_class: None,
            state: CallState::CreateRequest,
            input: None,
            request: None,
            response: None,
            result: None,
            error_result: None,
            error: None,
            mocked: false,
        }
    }

    /// Attach a free-form type hint for the response and error handlers.
    pub fn with_output_class(mut self, output_class: impl Into<String>) -> Self {
        self.output_class = Some(output_class.into());
        self
    }

    /// New call whose output class hint is the type name of `T`.
    pub fn for_output<T: ?Sized>(identifier: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(identifier, path).with_output_class(std::any::type_name::<T>())
    }

    /// Tag identifying the kind of call, for logging.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn output_class(&self) -> Option<&str> {
        self.output_class.as_deref()
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn input(&self) -> Option<&I> {
        self.input.as_ref()
    }

    pub fn request(&self) -> Option<&HttpRequest> {
        self.request.as_ref()
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub fn result(&self) -> Option<&O> {
        self.result.as_ref()
    }

    pub fn error_result(&self) -> Option<&E> {
        self.error_result.as_ref()
    }

    pub fn error(&self) -> Option<&CallError> {
        self.error.as_ref()
    }

    pub fn is_mocked(&self) -> bool {
        self.mocked
    }

    /// Register the built request and move to `HTTP_REQUEST`.
    pub fn set_request(
        &mut self,
        request: HttpRequest,
        mocked: bool,
        input: Option<I>,
    ) -> Result<&mut Self, IllegalStateError> {
        self.require(CallState::CreateRequest, "set a request")?;
        self.request = Some(request);
        self.mocked = mocked;
        self.input = input;
        self.advance();
        Ok(self)
    }

    /// Register the transport's response and move to `HANDLE_RESPONSE`.
    pub fn set_response(&mut self, response: HttpResponse) -> Result<&mut Self, IllegalStateError> {
        self.require(CallState::HttpRequest, "set a response")?;
        self.response = Some(response);
        self.advance();
        Ok(self)
    }

    /// Register the parsed result and move to `RETURN_RESPONSE`.
    pub fn set_result(&mut self, result: O) -> Result<&mut Self, IllegalStateError> {
        self.require(CallState::HandleResponse, "set a result")?;
        self.result = Some(result);
        self.advance();
        Ok(self)
    }

    /// Move the call into `HANDLE_ERROR_RESPONSE`, whatever state it is in.
    ///
    /// Returns the state the call was in before. A `Some` input replaces the
    /// stored input. Request and response fields that are still empty are
    /// filled from the error when it carries them.
    pub fn enter_error_branch(&mut self, error: CallError, input: Option<I>) -> CallState {
        if input.is_some() {
            self.input = input;
        }
        if self.request.is_none() {
            self.request = error.embedded_request().cloned();
        }
        if self.response.is_none() {
            self.response = error.embedded_response().cloned();
        }
        self.error = Some(error);

        let last_known_state = self.state;
        self.state = CallState::HandleErrorResponse;
        last_known_state
    }

    /// Register the error handler's fallback and move to `RETURN_ERROR_RESPONSE`.
    pub fn set_error_result(&mut self, error_result: E) -> Result<&mut Self, IllegalStateError> {
        self.require(CallState::HandleErrorResponse, "set an error result")?;
        self.error_result = Some(error_result);
        self.advance();
        Ok(self)
    }

    fn require(
        &self,
        expected: CallState,
        operation: &'static str,
    ) -> Result<(), IllegalStateError> {
        if self.state == expected {
            return Ok(());
        }
        Err(IllegalStateError {
            operation,
            state: self.state,
        })
    }

    fn advance(&mut self) {
        self.state = self.state.next_state();
    }
}
