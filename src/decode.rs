//! Structured decoding of normalized response bodies.

use crate::envelope::NormalizedResponse;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Date format of the REST API, e.g. `Mon, 16 Oct 2026 14:03:12 +0000`.
pub const DEFAULT_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";

/// Decodes JSON bodies into typed entities.
///
/// Strings matching the configured date format are rewritten to RFC 3339
/// before typed decoding, so entity fields can use `DateTime<Utc>`. Naive
/// formats are read as UTC.
///
/// The rewrite applies to every string in the body, whatever the field it
/// lands in: a `String` field whose server value matches the format receives
/// the RFC 3339 form, not the original text. Use
/// [`Response::raw_body`](crate::Response::raw_body) to see the text as sent.
///
/// # Examples
///
/// ```
/// use twilio_rest::{Decoder, ErrorEnvelope, RawResponse};
/// use chrono::{DateTime, Utc};
/// use http::StatusCode;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "PascalCase")]
/// struct Call {
///     sid: String,
///     date_created: DateTime<Utc>,
/// }
///
/// let body = r#"{"Call":{"Sid":"CA1","DateCreated":"Fri, 16 Oct 2026 14:03:12 +0000"}}"#;
/// let normalized = ErrorEnvelope::apply(RawResponse::new(StatusCode::OK, body));
///
/// let call: Call = Decoder::default().decode(&normalized, Some("Call"), None).unwrap();
/// assert_eq!(call.sid, "CA1");
/// assert_eq!(call.date_created.to_rfc3339(), "2026-10-16T14:03:12+00:00");
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    date_format: String,
}

impl Decoder {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Decodes a response body into `T`.
    ///
    /// When `root_element` names a top-level key of the body, only that value
    /// is decoded; otherwise the whole body is, which is how an error envelope
    /// reaches the entity's `RestException` field. An empty body decodes as
    /// `null`. `date_format` overrides the decoder's format for this call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] with the normalized body if the
    /// body is not JSON or does not fit `T`.
    pub fn decode<T>(
        &self,
        response: &NormalizedResponse,
        root_element: Option<&str>,
        date_format: Option<&str>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let failed = |e: serde_json::Error| {
            let raw_response = response.text().into_owned();
            tracing::error!(
                error = %e,
                raw_response = %raw_response,
                "Failed to deserialize response"
            );

            Error::DeserializationFailed {
                raw_response,
                serde_error: e.to_string(),
                status: response.status(),
            }
        };

        let body = response.body();
        let mut value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice::<Value>(body).map_err(failed)?
        };

        if let Some(root) = root_element {
            if let Some(scoped) = value.as_object_mut().and_then(|map| map.remove(root)) {
                value = scoped;
            }
        }

        rewrite_dates(&mut value, date_format.unwrap_or(&self.date_format));

        serde_json::from_value(value).map_err(failed)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

fn rewrite_dates(value: &mut Value, format: &str) {
    match value {
        Value::String(text) => {
            if let Some(parsed) = parse_date(text, format) {
                *text = parsed.to_rfc3339_opts(SecondsFormat::AutoSi, true);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| rewrite_dates(item, format)),
        Value::Object(map) => map.values_mut().for_each(|item| rewrite_dates(item, format)),
        _ => {}
    }
}

fn parse_date(text: &str, format: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_str(text, format) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .map(|naive| naive.and_utc())
}
