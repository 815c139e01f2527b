//! Blocking HTTP transport built on `ureq`.
//!
//! # Design
//! `UreqTransport` executes an `HttpRequest` and reads the whole response
//! into an `HttpResponse`. Headers from `TransportConfig::default_headers`
//! (auth tokens and the like) are added to the outgoing wire request only.
//! The request registered on the call record never sees them, so they never
//! reach the logs.
//!
//! With `http_errors` on, a 4xx/5xx answer becomes
//! `TransportError::Status`, which carries both wire objects.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::contracts::Transport;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const TIMEOUT_ENV: &str = "EXTERNAL_CALL_TIMEOUT_SECS";
pub const HTTP_ERRORS_ENV: &str = "EXTERNAL_CALL_HTTP_ERRORS";

/// A configuration value could not be parsed.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {name}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

/// Settings for `UreqTransport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Whole-request timeout. `None` waits forever.
    pub timeout_secs: Option<u64>,
    /// Treat 4xx/5xx responses as transport errors.
    pub http_errors: bool,
    /// Headers added to every outgoing request, after the request's own.
    pub default_headers: Vec<(String, String)>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            http_errors: true,
            default_headers: Vec::new(),
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_http_errors(mut self, http_errors: bool) -> Self {
        self.http_errors = http_errors;
        self
    }

    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_bearer_token(self, token: &str) -> Self {
        self.with_default_header("authorization", format!("Bearer {token}"))
    }

    /// Defaults overridden by `EXTERNAL_CALL_TIMEOUT_SECS` and
    /// `EXTERNAL_CALL_HTTP_ERRORS` when they are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(TIMEOUT_ENV) {
            let secs = value.trim().parse().map_err(|_| ConfigError {
                name: TIMEOUT_ENV,
                value: value.clone(),
            })?;
            config.timeout_secs = Some(secs);
        }
        if let Some(value) = lookup(HTTP_ERRORS_ENV) {
            config.http_errors = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError {
                        name: HTTP_ERRORS_ENV,
                        value,
                    })
                }
            };
        }
        Ok(config)
    }
}

/// `Transport` backed by a pooled `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    config: TransportConfig,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        // Status handling is ours: ureq must hand back every response.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout_secs.map(Duration::from_secs))
            .build()
            .new_agent();
        Self { agent, config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn execute(&self, request: &HttpRequest) -> Result<Response<Body>, ureq::Error> {
        let url = request.path.as_str();
        let body = request.body.as_deref();
        match request.method {
            HttpMethod::Get => self.headers(self.agent.get(url), request).call(),
            HttpMethod::Delete => self.headers(self.agent.delete(url), request).call(),
            HttpMethod::Post => send(self.headers(self.agent.post(url), request), body),
            HttpMethod::Put => send(self.headers(self.agent.put(url), request), body),
            HttpMethod::Patch => send(self.headers(self.agent.patch(url), request), body),
        }
    }

    fn headers<B>(
        &self,
        mut builder: RequestBuilder<B>,
        request: &HttpRequest,
    ) -> RequestBuilder<B> {
        for (name, value) in request.headers.iter().chain(&self.config.default_headers) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut raw = self.execute(request).map_err(transport_error)?;

        let status = raw.status().as_u16();
        let headers = raw
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = raw.body_mut().read_to_string().map_err(transport_error)?;

        let response = HttpResponse {
            status,
            reason: String::new(),
            headers,
            body,
        };
        if self.config.http_errors && status >= 400 {
            return Err(TransportError::Status {
                request: request.clone(),
                response,
            });
        }
        Ok(response)
    }
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&str>,
) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn transport_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        other => TransportError::Network(other.to_string()),
    }
}
