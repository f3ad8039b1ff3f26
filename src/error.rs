//! Error types for REST API calls.
//!
//! Failures fall into three families: validation failures raised before any
//! I/O, transport failures raised while dispatching, and API failures reported
//! by the remote service. API failures are normally delivered as a decoded
//! [`RestException`] inside the response entity; [`Error::Api`] only appears
//! when a caller opts into the checking adapter.

use crate::envelope::RestException;
use http::StatusCode;

/// Fixed message carried by [`Error::Application`].
pub const APPLICATION_ERROR_MESSAGE: &str =
    "Error retrieving response. Check inner details for more info.";

/// The main error type for REST API calls.
///
/// # Examples
///
/// ```no_run
/// use twilio_rest::{CallOptions, Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .account_sid("AC123")
///     .auth_token("secret")
///     .build()?;
///
/// match client.initiate_outbound_call(&CallOptions::default()).await {
///     Ok(response) => println!("Call: {:?}", response.data.sid),
///     Err(Error::Validation { field }) => eprintln!("missing option {field}"),
///     Err(e) if e.is_transport() => eprintln!("network trouble: {e}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required option was not supplied.
    ///
    /// Raised while building a request, so nothing has been sent.
    #[error("Missing required argument: {field}")]
    Validation {
        /// The name of the missing field, as sent on the wire
        field: String,
    },

    /// A placeholder in the resource template has no bound value.
    #[error("No value bound for URL segment {{{name}}}")]
    UnboundSegment {
        /// The placeholder name
        name: String,
    },

    /// A placeholder is bound to `.` or `..`, which would move the request
    /// to another resource.
    #[error("URL segment {{{name}}} cannot be {value:?}")]
    InvalidSegment {
        /// The placeholder name
        name: String,
        /// The rejected value
        value: String,
    },

    /// A network-level error occurred (connection refused, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The remote service answered with a status of 400 or above.
    ///
    /// Only produced by the checking adapters
    /// ([`Response::error_for_exception`](crate::Response::error_for_exception),
    /// [`Client::execute_checked`](crate::Client::execute_checked)).
    #[error("API error {status}: {exception}")]
    Api {
        /// The HTTP status code
        status: StatusCode,
        /// The decoded error details
        exception: RestException,
    },

    /// A failure surfaced by the one-shot executor.
    ///
    /// The underlying failure is available through `source`.
    #[error("{message}")]
    Application {
        /// Always [`APPLICATION_ERROR_MESSAGE`]
        message: &'static str,
        /// The failure that caused this error
        #[source]
        source: Box<Error>,
    },

    /// Failed to decode the response body into the expected type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The body handed to the decoder, after error-envelope normalization
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

impl Error {
    /// Wraps a failure the way the one-shot executor reports it.
    pub(crate) fn application(source: Error) -> Self {
        Error::Application {
            message: APPLICATION_ERROR_MESSAGE,
            source: Box::new(source),
        }
    }

    /// Returns `true` if the request was rejected before dispatch.
    ///
    /// # Examples
    ///
    /// ```
    /// use twilio_rest::Error;
    ///
    /// let err = Error::Validation { field: "Url".to_string() };
    /// assert!(err.is_validation());
    /// assert!(!err.is_transport());
    /// ```
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::UnboundSegment { .. } | Error::InvalidSegment { .. }
        )
    }

    /// Returns `true` for connection and timeout failures.
    ///
    /// Looks through [`Error::Application`] to the wrapped cause.
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout => true,
            Error::Application { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::Network(e) => e.status(),
            Error::Application { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            Error::Application { source, .. } => source.raw_response(),
            _ => None,
        }
    }

    /// Returns the decoded API error details, if any.
    pub fn exception(&self) -> Option<&RestException> {
        match self {
            Error::Api { exception, .. } => Some(exception),
            Error::Application { source, .. } => source.exception(),
            _ => None,
        }
    }
}

/// A specialized `Result` type for REST API calls.
pub type Result<T> = std::result::Result<T, Error>;
