//! The network boundary: a `Network` trait the worker fetches through,
//! and its production implementation on reqwest.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use tracing::{debug, warn};
use url::Url;

use crate::models::{FetchRequest, FetchedResponse, RequestMode, ResponseKind};

use super::NetError;

/// HTTP request timeout in seconds.
/// 30s allows for slow origins while failing fast enough that the offline
/// fallback path still feels responsive.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The outbound fetch capability. Production uses `HttpNetwork`; tests
/// script responses through the mock below.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. HTTP error statuses are `Ok` responses (they
    /// pass through interception unchanged); only transport failures are
    /// `Err`.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedResponse, NetError>;
}

/// reqwest-backed network client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
    app_origin: Url,
}

impl HttpNetwork {
    /// Create a client that classifies responses against the given app
    /// origin (responses landing on the same origin are `Basic`).
    pub fn new(app_origin: Url) -> Result<Self, NetError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, app_origin })
    }

    /// Classify a completed response. The final URL decides: a redirect off
    /// the app origin makes the response cross-origin.
    fn classify(&self, mode: RequestMode, final_url: &Url) -> ResponseKind {
        if final_url.origin() == self.app_origin.origin() {
            ResponseKind::Basic
        } else if mode == RequestMode::NoCors {
            ResponseKind::Opaque
        } else {
            ResponseKind::Cors
        }
    }

    fn request_headers(request: &FetchRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %name, "Dropping malformed request header"),
            }
        }
        headers
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedResponse, NetError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| NetError::InvalidRequest(format!("method {:?}", request.method)))?;

        debug!(method = %method, url = %request.url, "Fetching");

        let response = self
            .client
            .request(method, request.url.clone())
            .headers(Self::request_headers(request))
            .send()
            .await
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let kind = self.classify(request.mode, response.url());

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.to_string(), value.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| NetError::ConnectionFailed(e.to_string()))?
            .to_vec();

        Ok(FetchedResponse {
            status,
            headers,
            body,
            kind,
            from_cache: false,
        })
    }
}

// ============================================================================
// Test doubles
// ============================================================================
