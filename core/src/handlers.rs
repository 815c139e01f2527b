//! Stock error and log handlers.

use tracing::{error, info, warn};

use crate::call::ExternalCall;
use crate::contracts::{ErrorHandler, LogHandler};
use crate::error::{ErrorHandlerError, ErrorWithCall};
use crate::state::CallState;

/// Error handler that never recovers.
///
/// Fails with an `ErrorWithCall` wrapping the captured error together with
/// the call's state, request and response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrowOnError;

impl<I, O, E> ErrorHandler<I, O, E> for ThrowOnError {
    fn handle_error(&self, call: &ExternalCall<I, O, E>) -> Result<E, ErrorHandlerError> {
        Err(ErrorWithCall::new(
            call.error().cloned(),
            call.state(),
            call.request().cloned(),
            call.response().cloned(),
        )
        .into())
    }
}

/// Error handler that falls back to `E::default()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOnError;

impl<I, O, E: Default> ErrorHandler<I, O, E> for DefaultOnError {
    fn handle_error(&self, _call: &ExternalCall<I, O, E>) -> Result<E, ErrorHandlerError> {
        Ok(E::default())
    }
}

/// Emits one `tracing` event per finished call.
///
/// Successful calls log at `info`, handled failures at `warn`, and calls
/// whose error handler failed at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogHandler;

impl<I, O, E> LogHandler<I, O, E> for TracingLogHandler {
    fn log_request(&self, call: &ExternalCall<I, O, E>, error_state: Option<CallState>) {
        let method = call.request().map(|r| r.method.as_str()).unwrap_or("-");
        let url = call.request().map(|r| r.path.as_str()).unwrap_or(call.path());
        let status = call.response().map(|r| r.status);
        let cause = call.error().map(ToString::to_string);

        if let Some(last_known_state) = error_state {
            error!(
                identifier = %call.identifier(),
                path = %url,
                state = %call.state(),
                last_known_state = %last_known_state,
                method,
                status,
                mocked = call.is_mocked(),
                error = cause.as_deref(),
                "external call failed and its error handler failed"
            );
        } else if call.state().is_error_branch() {
            warn!(
                identifier = %call.identifier(),
                path = %url,
                state = %call.state(),
                method,
                status,
                mocked = call.is_mocked(),
                error = cause.as_deref(),
                "external call failed"
            );
        } else {
            info!(
                identifier = %call.identifier(),
                path = %url,
                state = %call.state(),
                method,
                status,
                mocked = call.is_mocked(),
                "external call completed"
            );
        }
    }
}
