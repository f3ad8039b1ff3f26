//! The parameter model for a single REST call.
//!
//! A [`RestRequest`] is pure data: an HTTP method, a resource template such as
//! `Accounts/{AccountSid}/Calls/{CallSid}`, the values bound to its
//! placeholders, and the body or query fields. Nothing here performs I/O.

use crate::{Error, Result};
use http::Method;
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::sync::LazyLock;

/// Placeholder bindings keyed by placeholder name.
pub type UrlSegments = IndexMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\w+\}").expect("a valid regex"));

/// Characters left as-is when a value is substituted into a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One logical call against the REST API.
///
/// # Examples
///
/// ```
/// use twilio_rest::RestRequest;
/// use http::Method;
///
/// let request = RestRequest::new(Method::GET)
///     .with_resource("Accounts/{AccountSid}/Calls/{CallSid}")
///     .with_url_segment("AccountSid", "AC123")
///     .with_url_segment("CallSid", "CA456")
///     .with_root_element("Call");
///
/// assert_eq!(
///     request.resolve_path(&Default::default()).unwrap(),
///     "Accounts/AC123/Calls/CA456"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RestRequest {
    method: Method,
    resource: String,
    segments: UrlSegments,
    fields: Vec<(String, String)>,
    root_element: Option<String>,
    date_format: Option<String>,
}

impl RestRequest {
    /// Creates an empty request using the given method.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            resource: String::new(),
            segments: UrlSegments::new(),
            fields: Vec::new(),
            root_element: None,
            date_format: None,
        }
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the resource template, relative to the versioned base URL.
    pub fn with_resource(mut self, template: impl Into<String>) -> Self {
        self.resource = template.into();
        self
    }

    /// Binds a value to a `{name}` placeholder.
    ///
    /// Binding the same name twice keeps the last value.
    pub fn with_url_segment(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.segments.insert(name.into(), value.into());
        self
    }

    /// Adds a body or query field.
    ///
    /// Fields keep insertion order, and a repeated name is sent once per value.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((name.into(), value.to_string()));
        self
    }

    /// Scopes decoding to the named top-level element of the response.
    pub fn with_root_element(mut self, name: impl Into<String>) -> Self {
        self.root_element = Some(name.into());
        self
    }

    /// Overrides the date format used to decode this response.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn url_segments(&self) -> &UrlSegments {
        &self.segments
    }

    pub fn has_url_segment(&self, name: &str) -> bool {
        self.segments.contains_key(name)
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn root_element(&self) -> Option<&str> {
        self.root_element.as_deref()
    }

    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    /// Returns `true` if fields travel as a form-encoded body rather than
    /// in the query string.
    pub fn sends_form_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }

    /// Substitutes every placeholder in the resource template.
    ///
    /// Values bound on the request win over `defaults`. Substituted values are
    /// percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnboundSegment`] for the first placeholder that has
    /// no value in either place, and [`Error::InvalidSegment`] for a value of
    /// `.` or `..`. URL resolution would treat those as path navigation even
    /// when percent-encoded.
    pub fn resolve_path(&self, defaults: &UrlSegments) -> Result<String> {
        let template = self.resource.as_str();
        let mut resolved = String::with_capacity(template.len());
        let mut last = 0;

        for placeholder in PLACEHOLDER.find_iter(template) {
            let name = &template[placeholder.start() + 1..placeholder.end() - 1];
            let value = self
                .segments
                .get(name)
                .or_else(|| defaults.get(name))
                .ok_or_else(|| Error::UnboundSegment {
                    name: name.to_string(),
                })?;
            if value == "." || value == ".." {
                return Err(Error::InvalidSegment {
                    name: name.to_string(),
                    value: value.clone(),
                });
            }

            resolved.push_str(&template[last..placeholder.start()]);
            resolved.extend(utf8_percent_encode(value, SEGMENT));
            last = placeholder.end();
        }
        resolved.push_str(&template[last..]);

        Ok(resolved)
    }
}

impl Default for RestRequest {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}
