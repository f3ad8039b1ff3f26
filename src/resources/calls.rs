//! Calls: fetching a call record and placing an outbound call.

use crate::envelope::{ApiResource, RestException};
use crate::{Client, Error, Response, RestApi, RestRequest, Result};
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Deserializer, Serialize};

const CALLS_RESOURCE: &str = "Accounts/{AccountSid}/Calls";
const CALL_RESOURCE: &str = "Accounts/{AccountSid}/Calls/{CallSid}";

/// A call record.
///
/// Fields missing from the response keep their default value. When the
/// request failed, `rest_exception` holds the error details and the other
/// fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Call {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_segment_sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_sid: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Length of the call in seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub duration: i32,
    /// Charge for the call, in the account's currency.
    ///
    /// Held as `f64`, so sums of many prices can drift by a fraction of a
    /// cent. `0.0` while the call is still in progress.
    #[serde(deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub flags: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_exception: Option<RestException>,
}

/// Reads an explicit `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiResource for Call {
    fn rest_exception(&self) -> Option<&RestException> {
        self.rest_exception.as_ref()
    }
}

/// Options for placing an outbound call.
///
/// `url` is required; every other field is sent only when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Caller id in E.164 format, e.g. `+16175551212`.
    pub from: Option<String>,
    /// The number to call.
    pub to: Option<String>,
    /// URL consulted for instructions when the call connects.
    pub url: Option<String>,
    /// Application that handles the call; its voice URLs take precedence.
    pub application_sid: Option<String>,
    pub status_callback: Option<String>,
    pub status_callback_method: Option<String>,
    /// Lifecycle events reported to `status_callback`: `initiated`,
    /// `ringing`, `answered`, `completed`.
    pub status_callback_events: Vec<String>,
    /// HTTP method used to request `url`.
    pub method: Option<String>,
    /// Keys to dial after connecting: digits, `#` and `*`.
    pub send_digits: Option<String>,
    /// Answering-machine handling: `Continue` or `Hangup`.
    pub if_machine: Option<String>,
    /// Seconds to let the phone ring before giving up.
    pub timeout: Option<u32>,
    pub fallback_url: Option<String>,
    pub fallback_method: Option<String>,
    /// Record the whole call.
    pub record: bool,
    pub sip_auth_username: Option<String>,
    pub sip_auth_password: Option<String>,
    pub recording_channels: Option<String>,
    pub recording_status_callback: Option<String>,
    pub recording_status_callback_method: Option<String>,
}

/// Builds the request that fetches one call.
pub fn get_call_request(call_sid: impl Into<String>) -> RestRequest {
    RestRequest::new(Method::GET)
        .with_resource(CALL_RESOURCE)
        .with_root_element("Call")
        .with_url_segment("CallSid", call_sid)
}

/// Builds the request that places an outbound call.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `Url` if no URL was given.
///
/// # Examples
///
/// ```
/// use twilio_rest::{resources::calls, CallOptions, Error};
///
/// let err = calls::initiate_outbound_call_request(&CallOptions::default()).unwrap_err();
/// assert!(matches!(err, Error::Validation { field } if field == "Url"));
/// ```
pub fn initiate_outbound_call_request(options: &CallOptions) -> Result<RestRequest> {
    let url = required("Url", options.url.as_deref())?;

    let mut request = RestRequest::new(Method::POST)
        .with_resource(CALLS_RESOURCE)
        .with_root_element("Calls");

    let optional = [
        ("From", &options.from),
        ("To", &options.to),
        ("ApplicationSid", &options.application_sid),
    ];
    for (name, value) in optional {
        if let Some(value) = present(value) {
            request = request.with_parameter(name, value);
        }
    }

    request = request.with_parameter("Url", url);

    let optional = [
        ("Method", &options.method),
        ("SendDigits", &options.send_digits),
        ("IfMachine", &options.if_machine),
        ("StatusCallback", &options.status_callback),
        ("StatusCallbackMethod", &options.status_callback_method),
        ("FallbackUrl", &options.fallback_url),
        ("FallbackMethod", &options.fallback_method),
        ("SipAuthUsername", &options.sip_auth_username),
        ("SipAuthPassword", &options.sip_auth_password),
        ("RecordingChannels", &options.recording_channels),
        ("RecordingStatusCallback", &options.recording_status_callback),
        (
            "RecordingStatusCallbackMethod",
            &options.recording_status_callback_method,
        ),
    ];
    for (name, value) in optional {
        if let Some(value) = present(value) {
            request = request.with_parameter(name, value);
        }
    }

    for event in &options.status_callback_events {
        request = request.with_parameter("StatusCallbackEvent", event);
    }
    if let Some(timeout) = options.timeout {
        request = request.with_parameter("Timeout", timeout);
    }
    if options.record {
        request = request.with_parameter("Record", true);
    }

    Ok(request)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Validation {
            field: field.to_string(),
        })
}

impl Client {
    /// Fetches a call by sid.
    pub async fn get_call(&self, call_sid: impl Into<String>) -> Result<Response<Call>> {
        self.execute(get_call_request(call_sid)).await
    }

    /// Places an outbound call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] without sending anything if `options.url`
    /// is missing.
    pub async fn initiate_outbound_call(&self, options: &CallOptions) -> Result<Response<Call>> {
        let request = initiate_outbound_call_request(options)?;
        self.execute(request).await
    }
}

impl RestApi {
    /// Fetches a call by sid.
    pub async fn get_call(&self, call_sid: impl Into<String>) -> Result<Call> {
        self.execute(get_call_request(call_sid)).await
    }

    /// Places an outbound call.
    pub async fn initiate_outbound_call(&self, options: &CallOptions) -> Result<Call> {
        let request = initiate_outbound_call_request(options)?;
        self.execute(request).await
    }
}
