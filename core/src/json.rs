//! JSON request factory and response handler.
//!
//! # Design
//! `JsonRequestFactory` only knows a base URL. The call's path is appended to
//! it, and the input is serialized with `serde_json` as the body.
//! `JsonResponseHandler` does the reverse for the call's output type. Both
//! are stateless and can back any number of clients.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::call::ExternalCall;
use crate::contracts::{RequestFactory, ResponseHandler};
use crate::error::CallError;
use crate::http::{HttpMethod, HttpRequest};

const CONTENT_TYPE: (&str, &str) = ("content-type", "application/json");

/// Builds JSON requests against a base URL.
#[derive(Debug, Clone)]
pub struct JsonRequestFactory {
    base_url: String,
}

impl JsonRequestFactory {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Full URL for a call path. Absolute URLs are used as they are.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_body<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, CallError> {
        let body =
            serde_json::to_string(input).map_err(|e| CallError::Construction(e.to_string()))?;
        Ok(HttpRequest::new(method, self.url(path))
            .with_header(CONTENT_TYPE.0, CONTENT_TYPE.1)
            .with_body(body))
    }
}

impl<I: Serialize, O, E> RequestFactory<I, O, E> for JsonRequestFactory {
    fn create_post_request(
        &self,
        call: &ExternalCall<I, O, E>,
        input: &I,
    ) -> Result<HttpRequest, CallError> {
        self.with_body(HttpMethod::Post, call.path(), input)
    }

    fn create_put_request(
        &self,
        call: &ExternalCall<I, O, E>,
        input: &I,
    ) -> Result<HttpRequest, CallError> {
        self.with_body(HttpMethod::Put, call.path(), input)
    }

    fn create_get_request(&self, call: &ExternalCall<I, O, E>) -> Result<HttpRequest, CallError> {
        Ok(HttpRequest::new(HttpMethod::Get, self.url(call.path())))
    }
}

/// Deserializes a 2xx JSON body into the call's output type.
///
/// An empty body is read as JSON `null`, so `()` and `Option<T>` outputs
/// accept `204 No Content`.
pub struct JsonResponseHandler<O> {
    _output: PhantomData<fn() -> O>,
}

impl<O> JsonResponseHandler<O> {
    pub fn new() -> Self {
        Self {
            _output: PhantomData,
        }
    }
}

impl<O> Default for JsonResponseHandler<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for JsonResponseHandler<O> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<I, O: DeserializeOwned, E> ResponseHandler<I, O, E> for JsonResponseHandler<O> {
    fn handle_response(&self, call: &ExternalCall<I, O, E>) -> Result<O, CallError> {
        let response = call
            .response()
            .ok_or_else(|| CallError::Parsing("no response registered".to_string()))?;
        if !response.is_success() {
            return Err(CallError::Parsing(format!(
                "unexpected status {} {}",
                response.status,
                response.reason_phrase()
            )));
        }
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| CallError::Parsing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::http::HttpResponse;

    #[derive(Debug, Serialize)]
    struct NewItem {
        name: String,
        quantity: u32,
    }

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct Item {
        id: u64,
    }

    type Call = ExternalCall<NewItem, Item, ()>;

    fn factory() -> JsonRequestFactory {
        JsonRequestFactory::new("http://localhost:3000/")
    }

    fn input() -> NewItem {
        NewItem {
            name: "Buy milk".to_string(),
            quantity: 2,
        }
    }

    fn call_with_response(status: u16, body: &str) -> Call {
        let mut call = Call::new("items", "/items");
        call.set_request(HttpRequest::new(HttpMethod::Get, "/items"), false, None)
            .unwrap();
        call.set_response(HttpResponse::new(status, body)).unwrap();
        call
    }

    #[test]
    fn post_request_carries_json_body() {
        let call = Call::new("items", "items");
        let req = factory().create_post_request(&call, &input()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/items");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Buy milk");
        assert_eq!(body["quantity"], 2);
    }

    #[test]
    fn put_request_uses_put() {
        let call = Call::new("items", "/items/7");
        let req = factory().create_put_request(&call, &input()).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/items/7");
    }

    #[test]
    fn get_request_has_no_body_or_headers() {
        let call = Call::new("items", "/items/7");
        let req = factory().create_get_request(&call).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn absolute_path_is_kept() {
        assert_eq!(factory().url("https://other.example/x"), "https://other.example/x");
        assert_eq!(factory().url(""), "http://localhost:3000");
    }

    #[test]
    fn handles_json_body() {
        let call = call_with_response(200, r#"{"id":42}"#);
        let item = JsonResponseHandler::new().handle_response(&call).unwrap();
        assert_eq!(item, Item { id: 42 });
    }

    #[test]
    fn bad_json_is_a_parsing_error() {
        let call = call_with_response(200, "not json");
        let err = JsonResponseHandler::new().handle_response(&call).unwrap_err();
        assert!(matches!(err, CallError::Parsing(_)));
    }

    #[test]
    fn non_success_status_is_a_parsing_error() {
        let call = call_with_response(500, "internal error");
        let err = JsonResponseHandler::new().handle_response(&call).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to handle response: unexpected status 500 Internal Server Error"
        );
    }

    #[test]
    fn empty_body_reads_as_null() {
        let mut call: ExternalCall<(), Option<Item>, ()> = ExternalCall::new("items", "/items/7");
        call.set_request(HttpRequest::new(HttpMethod::Get, "/items/7"), false, None)
            .unwrap();
        call.set_response(HttpResponse::new(204, "")).unwrap();
        let item = JsonResponseHandler::new().handle_response(&call).unwrap();
        assert_eq!(item, None);
    }

    #[test]
    fn missing_response_is_a_parsing_error() {
        let call = Call::new("items", "/items");
        let err = JsonResponseHandler::new().handle_response(&call).unwrap_err();
        assert!(matches!(err, CallError::Parsing(_)));
    }
}
