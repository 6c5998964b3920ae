//! Merchant API client (protocol driver)

use crate::{
    config::ClientConfig,
    metrics::{P24_REQUESTS_TOTAL, P24_REQUEST_DURATION},
    request::{Request, RequestData},
    response::{RawResponse, Response},
    signer::Merchant,
    transport::{HttpRequest, ReqwestTransport, Transport},
    Error, Result,
};
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Content type of every request
pub const CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Card balance endpoint
pub const BALANCE_URL: &str = "https://api.privatbank.ua/p24api/balance";

/// Card statements endpoint
pub const STATEMENTS_URL: &str = "https://api.privatbank.ua/p24api/rest_fiz";

/// Endpoint URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Card balance
    pub balance: String,
    /// Card statements
    pub statements: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            balance: BALANCE_URL.to_string(),
            statements: STATEMENTS_URL.to_string(),
        }
    }
}

/// Merchant API client.
///
/// Cheap to clone; the merchant identity and transport are shared read-only.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    merchant: Merchant,
    pub(crate) endpoints: Endpoints,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("merchant", &self.merchant)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl Client {
    /// Create client with default endpoints
    pub fn new(merchant: Merchant, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            merchant,
            endpoints: Endpoints::default(),
        }
    }

    /// Create client over `reqwest` from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_seconds))?;
        Ok(Self::new(config.merchant(), Arc::new(transport)).with_endpoints(config.endpoints()))
    }

    /// Override endpoint URLs
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Merchant identity
    pub fn merchant(&self) -> &Merchant {
        &self.merchant
    }

    /// Build a signed envelope for `data` and perform the call
    pub async fn call<I: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        data: RequestData,
    ) -> Result<Response<I>> {
        let request = Request::new(&self.merchant, data)?;
        self.send(url, method, &request).await
    }

    /// Send a signed envelope, validate the reply and decode its payload into `I`.
    ///
    /// Every error is annotated with the url, method and exchanged bodies.
    pub async fn send<I: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        request: &Request,
    ) -> Result<Response<I>> {
        let body = Bytes::from(request.to_xml()?);

        let start = Instant::now();
        let result = self.exchange(url, &method, &body).await;
        P24_REQUEST_DURATION
            .with_label_values(&[url])
            .observe(start.elapsed().as_secs_f64());

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };
        P24_REQUESTS_TOTAL.with_label_values(&[url, outcome]).inc();

        if let Err(e) = &result {
            warn!("{} {} failed: {}", method, url, e);
        }
        result
    }

    async fn exchange<I: DeserializeOwned>(
        &self,
        url: &str,
        method: &Method,
        body: &Bytes,
    ) -> Result<Response<I>> {
        debug!("{} {} ({} bytes)", method, url, body.len());

        let http_request = HttpRequest {
            method: method.clone(),
            url: url.to_string(),
            headers: vec![("Content-Type".to_string(), CONTENT_TYPE.to_string())],
            body: body.clone(),
        };

        let http_response = self
            .transport
            .execute(http_request)
            .await
            .map_err(|e| Error::Transport(e).annotate(url, method, body, None))?;

        let reply = &http_response.body;
        debug!("{} {} -> {} ({} bytes)", method, url, http_response.status, reply.len());

        if http_response.status >= 300 {
            return Err(Error::UnexpectedStatus(http_response.status).annotate(
                url,
                method,
                body,
                Some(reply),
            ));
        }

        let raw = RawResponse(reply);
        raw.validate(&self.merchant)
            .and_then(|()| raw.decode())
            .map_err(|e| e.annotate(url, method, body, Some(reply)))
    }
}
