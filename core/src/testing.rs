//! In-memory `Transport` for unit tests.

use std::cell::RefCell;

use url::form_urlencoded;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Records every request and answers each one with the same canned result.
pub(crate) struct MockTransport {
    reply: Result<HttpResponse, TransportError>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn ok() -> Self {
        Self::reply(200, r#"{"status":1,"request":"647d2300-702c-4b38-8b2f-d56326ae460b"}"#)
    }

    pub(crate) fn reply(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn fail(err: TransportError) -> Self {
        Self {
            reply: Err(err),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.reply.clone()
    }
}

pub(crate) fn form_fields(request: &HttpRequest) -> Vec<(String, String)> {
    let body = request.body.as_deref().unwrap_or_default();
    form_urlencoded::parse(body.as_bytes()).into_owned().collect()
}

pub(crate) fn query_fields(request: &HttpRequest) -> Vec<(String, String)> {
    let query = request.url.split_once('?').map(|(_, q)| q).unwrap_or_default();
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}
