//! Error-envelope normalization.
//!
//! The REST API reports failures in a different shape from its success
//! payloads. Before any decoding, a response whose status is 400 or above has
//! its body rewritten to `{"RestException":<body>}`, so a single decode path can
//! fill either a success entity or the [`RestException`] carried by that entity.

use crate::transport::RawResponse;
use bytes::{BufMut, Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

const ENVELOPE_OPEN: &[u8] = b"{\"RestException\":";
const ENVELOPE_CLOSE: &[u8] = b"}";

/// The pre-decode normalization step.
///
/// [`ErrorEnvelope::apply`] is the only way to obtain a [`NormalizedResponse`],
/// and it consumes the [`RawResponse`], so a body is wrapped at most once.
///
/// # Examples
///
/// ```
/// use twilio_rest::{ErrorEnvelope, RawResponse};
/// use http::StatusCode;
///
/// let raw = RawResponse::new(StatusCode::NOT_FOUND, r#"{"Message":"not found"}"#);
/// let normalized = ErrorEnvelope::apply(raw);
///
/// assert!(normalized.is_enveloped());
/// assert_eq!(normalized.text(), r#"{"RestException":{"Message":"not found"}}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorEnvelope;

impl ErrorEnvelope {
    /// Returns `true` if a response with this status gets wrapped.
    pub fn applies_to(status: StatusCode) -> bool {
        status.as_u16() >= 400
    }

    /// Normalizes a raw response.
    ///
    /// Successful responses pass through byte-for-byte. For failures, a body
    /// that is valid JSON is embedded verbatim; an empty body becomes `null`
    /// and any other text is embedded as a JSON string.
    pub fn apply(raw: RawResponse) -> NormalizedResponse {
        let RawResponse {
            status,
            headers,
            body,
        } = raw;

        if !Self::applies_to(status) {
            return NormalizedResponse {
                status,
                headers,
                body,
                enveloped: false,
            };
        }

        NormalizedResponse {
            status,
            headers,
            body: wrap(&body),
            enveloped: true,
        }
    }
}

fn wrap(body: &[u8]) -> Bytes {
    let text = String::from_utf8_lossy(body);
    let inner: Cow<'_, [u8]> = if text.trim().is_empty() {
        Cow::Borrowed(b"null")
    } else if serde_json::from_slice::<IgnoredAny>(body).is_ok() {
        Cow::Borrowed(body)
    } else {
        match serde_json::to_vec(&*text) {
            Ok(quoted) => Cow::Owned(quoted),
            Err(_) => Cow::Borrowed(b"null"),
        }
    };

    let mut wrapped = BytesMut::with_capacity(ENVELOPE_OPEN.len() + inner.len() + 1);
    wrapped.put_slice(ENVELOPE_OPEN);
    wrapped.put_slice(&inner);
    wrapped.put_slice(ENVELOPE_CLOSE);
    wrapped.freeze()
}

/// A response that has been through [`ErrorEnvelope::apply`].
#[derive(Debug, Clone)]
pub struct NormalizedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    enveloped: bool,
}

impl NormalizedResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Returns `true` if the body was wrapped in the error envelope.
    pub fn is_enveloped(&self) -> bool {
        self.enveloped
    }
}

/// Error details returned by the REST API.
///
/// Both the PascalCase and snake_case spellings of the well-known fields are
/// accepted. Unrecognized keys are kept in `details`. A plain-text error body
/// ends up in `message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExceptionRepr", rename_all = "PascalCase")]
pub struct RestException {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl fmt::Display for RestException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.code) {
            (Some(message), Some(code)) => write!(f, "{message} (code {code})"),
            (Some(message), None) => f.write_str(message),
            (None, Some(code)) => write!(f, "error code {code}"),
            (None, None) => f.write_str("unknown error"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExceptionRepr {
    Detail(ExceptionDetail),
    Text(String),
    Other(Value),
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExceptionDetail {
    #[serde(default, alias = "status")]
    status: Option<u16>,
    #[serde(default, alias = "message")]
    message: Option<String>,
    #[serde(default, alias = "code")]
    code: Option<u32>,
    #[serde(default, alias = "more_info")]
    more_info: Option<String>,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl From<ExceptionRepr> for RestException {
    fn from(repr: ExceptionRepr) -> Self {
        match repr {
            ExceptionRepr::Detail(detail) => RestException {
                status: detail.status,
                message: detail.message,
                code: detail.code,
                more_info: detail.more_info,
                details: detail.details,
            },
            ExceptionRepr::Text(message) => RestException {
                message: Some(message),
                ..Default::default()
            },
            ExceptionRepr::Other(Value::Object(details)) => RestException {
                details,
                ..Default::default()
            },
            ExceptionRepr::Other(Value::Null) => RestException::default(),
            ExceptionRepr::Other(other) => RestException {
                message: Some(other.to_string()),
                ..Default::default()
            },
        }
    }
}

/// An entity that can carry error details decoded from an error envelope.
pub trait ApiResource: DeserializeOwned {
    /// The decoded error details, if the response was a failure.
    fn rest_exception(&self) -> Option<&RestException>;
}
