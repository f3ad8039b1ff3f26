//! Response wrapper that preserves both decoded data and raw response details.
//!
//! The [`Response`] type wraps the decoded entity along with the status,
//! headers, latency and the body handed to the decoder, so callers can inspect
//! an embedded [`RestException`] or log exactly what the server sent.

use crate::envelope::{ApiResource, RestException};
use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A decoded response.
///
/// A response is returned for every status code. For a status of 400 or above
/// the entity carries the decoded error details instead of success data; use
/// [`Response::exception`] to check for them, or
/// [`Response::error_for_exception`] to turn them into an [`Error::Api`].
///
/// # Examples
///
/// ```no_run
/// use twilio_rest::Client;
///
/// # async fn example() -> Result<(), twilio_rest::Error> {
/// let client = Client::builder()
///     .account_sid("AC123")
///     .auth_token("secret")
///     .build()?;
///
/// let response = client.get_call("CA123").await?;
/// match response.exception() {
///     Some(exception) => eprintln!("API error {}: {}", response.status, exception),
///     None => println!("Call lasted {}s", response.data.duration),
/// }
/// println!("Request took {:?}", response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded entity.
    pub data: T,

    /// The body that was decoded, after error-envelope normalization.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from dispatch until the full body was received.
    pub latency: Duration,
}

impl<T> Response<T> {
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Maps the response data to a different type using the provided function.
    ///
    /// # Examples
    ///
    /// ```
    /// # use twilio_rest::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     42,
    ///     "42".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    /// );
    ///
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.data, "42");
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Returns `true` if the server answered with a status of 400 or above.
    pub fn is_api_error(&self) -> bool {
        self.status.as_u16() >= 400
    }

    /// Returns a reference to a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Consumes the response, keeping only the entity.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: ApiResource> Response<T> {
    /// The error details embedded in the entity, if any.
    pub fn exception(&self) -> Option<&RestException> {
        self.data.rest_exception()
    }

    /// Converts an embedded [`RestException`] into [`Error::Api`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use twilio_rest::{Call, Error, Response, RestException};
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let call = Call {
    ///     rest_exception: Some(RestException {
    ///         message: Some("not found".to_string()),
    ///         ..Default::default()
    ///     }),
    ///     ..Default::default()
    /// };
    /// let response = Response::new(
    ///     call,
    ///     String::new(),
    ///     StatusCode::NOT_FOUND,
    ///     HeaderMap::new(),
    ///     Duration::ZERO,
    /// );
    ///
    /// match response.error_for_exception() {
    ///     Err(Error::Api { status, exception }) => {
    ///         assert_eq!(status, StatusCode::NOT_FOUND);
    ///         assert_eq!(exception.message.as_deref(), Some("not found"));
    ///     }
    ///     other => panic!("unexpected: {:?}", other),
    /// }
    /// ```
    pub fn error_for_exception(self) -> Result<Self> {
        match self.data.rest_exception() {
            Some(exception) => Err(Error::Api {
                status: self.status,
                exception: exception.clone(),
            }),
            None => Ok(self),
        }
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
