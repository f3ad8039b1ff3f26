//! The request pipeline shared by [`Client`](crate::Client) and
//! [`RestApi`](crate::RestApi).
//!
//! resolve (with default segments) → authenticate → dispatch → normalize → decode.

use crate::auth::Credentials;
use crate::decode::Decoder;
use crate::envelope::ErrorEnvelope;
use crate::request::{RestRequest, UrlSegments};
use crate::transport::{HttpRequest, RawResponse, Transport};
use crate::{Error, Response, Result};
use http::header::ACCEPT;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::form_urlencoded;
use url::Url;

/// Placeholder that every resource under an account is keyed on.
pub(crate) const ACCOUNT_SID_SEGMENT: &str = "AccountSid";

pub(crate) struct Executor {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) base_url: Url,
    pub(crate) credentials: Credentials,
    pub(crate) default_headers: HeaderMap,
    pub(crate) default_segments: UrlSegments,
    pub(crate) timeout: Option<Duration>,
    pub(crate) decoder: Decoder,
}

impl Executor {
    /// Resolves the request against the session configuration.
    ///
    /// Fails before any I/O if a placeholder is unbound.
    pub(crate) fn prepare(&self, request: &RestRequest) -> Result<HttpRequest> {
        let path = request.resolve_path(&self.default_segments)?;
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;

        let mut body = None;
        if !request.parameters().is_empty() {
            if request.sends_form_body() {
                body = Some(
                    form_urlencoded::Serializer::new(String::new())
                        .extend_pairs(request.parameters())
                        .finish(),
                );
            } else {
                url.query_pairs_mut().extend_pairs(request.parameters());
            }
        }

        let mut headers = self.default_headers.clone();
        let (name, value) = self.credentials.to_header()?;
        headers.insert(name, value);

        Ok(HttpRequest {
            method: request.method().clone(),
            url,
            headers,
            body,
            timeout: self.timeout,
        })
    }

    /// Sends the request and returns the response untouched.
    pub(crate) async fn dispatch(&self, request: &RestRequest) -> Result<(RawResponse, Duration)> {
        let http_request = self.prepare(request)?;

        tracing::debug!(
            method = %http_request.method,
            url = %http_request.url,
            "Executing HTTP request"
        );

        let start_time = Instant::now();
        let raw = self.transport.send(http_request).await.inspect_err(|e| {
            tracing::warn!(
                error = %e,
                method = %request.method(),
                resource = %request.resource(),
                "Request failed"
            );
        })?;
        let latency = start_time.elapsed();

        tracing::info!(
            status = raw.status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received HTTP response"
        );

        Ok((raw, latency))
    }

    /// Runs the full pipeline and decodes into `T`.
    ///
    /// A status of 400 or above is not an error here: the error envelope is
    /// decoded into `T` like any other body.
    pub(crate) async fn execute<T>(&self, request: RestRequest) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let (raw, latency) = self.dispatch(&request).await?;
        let normalized = ErrorEnvelope::apply(raw);

        if normalized.is_enveloped() {
            tracing::warn!(
                status = normalized.status().as_u16(),
                response = %normalized.text(),
                "API returned an error"
            );
        }

        let root_element = request.root_element();
        let date_format = request.date_format();
        let data = self.decoder.decode(&normalized, root_element, date_format)?;

        Ok(Response::new(
            data,
            normalized.text().into_owned(),
            normalized.status(),
            normalized.headers().clone(),
            latency,
        ))
    }
}

/// Headers sent by both executors.
pub(crate) fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("accept-charset"),
        HeaderValue::from_static("utf-8"),
    );
    headers
}

/// Joins a base URL and API version into a directory URL ending in `/`.
pub(crate) fn versioned_base_url(base_url: &str, api_version: &str) -> Result<Url> {
    let base = base_url.trim_end_matches('/');
    let version = api_version.trim_matches('/');

    let joined = if version.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{version}/")
    };
    let url = Url::parse(&joined)?;

    if url.cannot_be_a_base() {
        return Err(Error::ConfigurationError(format!(
            "Base URL cannot carry a path: {}",
            base_url
        )));
    }
    Ok(url)
}
