//! Scripted transport and helpers for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderValue};

use crate::GedcomxClient;
use crate::config::ClientConfig;
use crate::state::DefaultStateFactory;
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::invalid_request("stub transport has no response queued"))
    }
}

/// A client over `stub` with default config and the core factory.
pub fn client_with(stub: Arc<StubTransport>) -> GedcomxClient {
    GedcomxClient::with_transport(
        &ClientConfig::default(),
        stub,
        Arc::new(DefaultStateFactory::gedcomx()),
    )
    .unwrap()
}

/// A GEDCOM X JSON response.
pub fn json_response(status: StatusCode, body: &str) -> HttpResponse {
    HttpResponse::new(status)
        .with_header(
            CONTENT_TYPE,
            HeaderValue::from_static(crate::model::GEDCOMX_JSON),
        )
        .with_body(body.as_bytes().to_vec())
}
