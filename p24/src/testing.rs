//! Test transports

use crate::error::BoxError;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Mutex};

/// Replies with a canned response and records what it was sent
pub(crate) struct CannedTransport {
    status: u16,
    body: &'static str,
    pub(crate) seen: Mutex<Vec<HttpRequest>>,
}

impl CannedTransport {
    pub(crate) fn new(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Body of the only request received
    pub(crate) fn sent_body(&self) -> String {
        let seen = self.seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "expected exactly one request");
        String::from_utf8(seen[0].body.to_vec()).unwrap()
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        self.seen.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: self.status,
            headers: Vec::new(),
            body: Bytes::from_static(self.body.as_bytes()),
        })
    }
}

/// Fails every request at the transport level
pub(crate) struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn execute(&self, _: HttpRequest) -> Result<HttpResponse, BoxError> {
        Err("connection refused".into())
    }
}
