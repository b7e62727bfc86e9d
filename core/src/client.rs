//! Request builder, transport driver and response wrapper for the Pushover API.
//!
//! # Design
//! Each operation is split into a pure `build_*` method that produces an
//! `HttpRequest` and the shared `parse_response`, which turns any
//! `HttpResponse` into a `Response`. The convenience methods (`notify`,
//! `validate`, `receipt`) run the request through the injected `Transport`
//! in between. Callers that do their own I/O can use the two halves
//! directly.
//!
//! `parse_response` never looks at the HTTP status. The API sends a JSON
//! object with `status: 0` on failure, so a 400 with a JSON body is a
//! `Response` whose `ok()` is false, not an error.
//!
//! The token is a plain field. `set_token` takes `&mut self`; a client
//! shared between threads needs the caller's own lock to change it.

use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::response::Response;
use crate::user::UserHandle;

/// Root of every endpoint.
pub const BASE_URL: &str = "https://api.pushover.net/1";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Pushover API client bound to one application token.
#[derive(Debug, Clone)]
pub struct Client<T> {
    token: String,
    base_url: String,
    transport: T,
}

#[cfg(feature = "ureq")]
impl Client<crate::transport::UreqTransport> {
    /// Client using the blocking `ureq` transport with default settings.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_transport(token, crate::transport::UreqTransport::new())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(token: impl Into<String>, transport: T) -> Self {
        Self {
            token: token.into(),
            base_url: BASE_URL.to_string(),
            transport,
        }
    }

    /// Point the client at another API root, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Bind `key` so it does not have to be repeated on every call.
    pub fn user(&self, key: impl Into<String>) -> UserHandle<'_, T> {
        UserHandle::new(key, self)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Send `message` to `user_key`. `options` are added to the form and
    /// replace `token`, `user` or `message` if they reuse those names.
    pub fn notify(
        &self,
        user_key: &str,
        message: &str,
        options: &Map<String, Value>,
    ) -> Result<Response> {
        self.send(self.build_notify(user_key, message, options))
    }

    /// Check that `user_key` (and `device`, when given) is registered.
    pub fn validate(&self, user_key: &str, device: Option<&str>) -> Result<Response> {
        self.send(self.build_validate(user_key, device))
    }

    /// `validate` reduced to its success flag.
    pub fn validate_ok(&self, user_key: &str, device: Option<&str>) -> Result<bool> {
        self.validate(user_key, device).map(|response| response.ok())
    }

    /// Poll the receipt of an emergency-priority notification.
    pub fn receipt(&self, id: &str) -> Result<Response> {
        self.send(self.build_receipt(id))
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    pub fn build_notify(
        &self,
        user_key: &str,
        message: &str,
        options: &Map<String, Value>,
    ) -> HttpRequest {
        let mut params = self.base_params();
        set_param(&mut params, "user", user_key.to_string());
        set_param(&mut params, "message", message.to_string());
        for (key, value) in options {
            set_param(&mut params, key, form_value(value));
        }
        self.post(format!("{}/messages.json", self.base_url), &params)
    }

    pub fn build_validate(&self, user_key: &str, device: Option<&str>) -> HttpRequest {
        let mut params = self.base_params();
        set_param(&mut params, "user", user_key.to_string());
        if let Some(device) = device.filter(|d| !d.is_empty()) {
            set_param(&mut params, "device", device.to_string());
        }
        self.post(format!("{}/users/validate.json", self.base_url), &params)
    }

    pub fn build_receipt(&self, id: &str) -> HttpRequest {
        let params = self.base_params();
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/receipts/{id}.json?{}", self.base_url, encode(&params)),
            headers: Vec::new(),
            body: None,
        }
    }

    // -----------------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------------

    /// Wrap a received body, whatever its HTTP status.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Response> {
        Response::parse(&response.body).map_err(|err| {
            warn!(status = response.status, error = %err, "response body is not a JSON object");
            ApiError::from(err)
        })
    }

    fn send(&self, request: HttpRequest) -> Result<Response> {
        let endpoint = request.url.split('?').next().unwrap_or_default();
        debug!(method = request.method.as_str(), endpoint, "sending request");

        let response = self.transport.execute(&request).map_err(|err| {
            warn!(endpoint, error = %err, "request failed without a response");
            err
        })?;
        debug!(
            endpoint,
            status = response.status,
            success = response.is_success(),
            "received response"
        );

        self.parse_response(response)
    }

    fn base_params(&self) -> Vec<(String, String)> {
        vec![("token".to_string(), self.token.clone())]
    }

    fn post(&self, url: String, params: &[(String, String)]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: Some(encode(params)),
        }
    }
}

/// Insert or overwrite in place; later writers win.
fn set_param(params: &mut Vec<(String, String)>, key: &str, value: String) {
    match params.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => *existing = value,
        None => params.push((key.to_string(), value)),
    }
}

/// Form representation of an option value.
fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn encode(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}
