//! The HTTP dispatch seam.
//!
//! [`Transport`] performs one network round trip for an already-built
//! [`HttpRequest`]. The executors never talk to `reqwest` directly, which lets
//! tests substitute an in-process transport.

use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::borrow::Cow;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use url::Url;

/// A fully resolved HTTP request, ready to send.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: Url,
    /// Authorization and default headers.
    pub headers: HeaderMap,
    /// Form-encoded body, for methods that carry one.
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

/// A response as received, before any normalization or decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Sends requests over the network.
///
/// A transport holds connection-level state only; per-call data travels in the
/// [`HttpRequest`]. Implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one round trip.
    ///
    /// # Errors
    ///
    /// Connection failures are reported as [`Error::Network`] and timeouts as
    /// [`Error::Timeout`]. A response with an error status is not an error here.
    async fn send(&self, request: HttpRequest) -> Result<RawResponse>;

    /// Replaces the proxy used for subsequent requests.
    ///
    /// Transports without proxy support ignore the setting.
    fn set_proxy(&self, proxy: Option<&Url>) -> Result<()> {
        let _ = proxy;
        Ok(())
    }
}

/// Produces a fresh transport for a single call.
pub trait Connect: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn Transport>>;
}

/// The default [`Transport`], backed by a `reqwest` connection pool.
///
/// Changing the proxy rebuilds the pool. Requests already in flight keep the
/// pool they started with.
#[derive(Debug)]
pub struct ReqwestTransport {
    http_client: RwLock<reqwest::Client>,
}

impl ReqwestTransport {
    /// Creates a transport using the system proxy settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        Self::with_proxy(None)
    }

    /// Creates a transport that routes every request through `proxy`.
    pub fn with_proxy(proxy: Option<&Url>) -> Result<Self> {
        Ok(Self {
            http_client: RwLock::new(build_http_client(proxy)?),
        })
    }

    fn current(&self) -> reqwest::Client {
        self.http_client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn build_http_client(proxy: Option<&Url>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy.as_str())
            .map_err(|e| Error::ConfigurationError(format!("Invalid proxy: {}", e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| Error::ConfigurationError(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self.current().request(method, url).headers(headers);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = body {
            builder = builder
                .header(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                )
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn set_proxy(&self, proxy: Option<&Url>) -> Result<()> {
        let rebuilt = build_http_client(proxy)?;
        *self
            .http_client
            .write()
            .unwrap_or_else(PoisonError::into_inner) = rebuilt;

        tracing::debug!(proxy_host = ?proxy.and_then(Url::host_str), "Reconfigured transport proxy");
        Ok(())
    }
}

/// Builds a new [`ReqwestTransport`] on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestConnector;

impl Connect for ReqwestConnector {
    fn connect(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(ReqwestTransport::new()?))
    }
}
