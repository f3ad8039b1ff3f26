//! Persistent, configurable REST client.
//!
//! The [`Client`] type holds session configuration and a reusable transport.
//! Use [`ClientBuilder`] to configure and create clients.

use crate::auth::{Credentials, SecretString};
use crate::decode::{Decoder, DEFAULT_DATE_FORMAT};
use crate::envelope::ApiResource;
use crate::executor::{base_headers, versioned_base_url, Executor, ACCOUNT_SID_SEGMENT};
use crate::request::{RestRequest, UrlSegments};
use crate::transport::{RawResponse, ReqwestTransport, Transport};
use crate::{Error, Response, Result};
use http::header::USER_AGENT;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use url::Url;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// API version used by [`Client`] unless configured otherwise.
pub const DEFAULT_API_VERSION: &str = "2010-04-01";

/// Request timeout used by [`Client`] unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_500);

/// `User-Agent` sent by [`Client`] unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (Rust/",
    env!("CARGO_PKG_RUST_VERSION"),
    ")"
);

/// A long-lived client for the REST API.
///
/// The client is designed to be reused across many requests, including
/// concurrent ones: it holds only configuration and a shared connection pool.
/// Every request is authenticated with HTTP Basic credentials and has the
/// `{AccountSid}` placeholder bound to the configured account unless the
/// request binds it itself.
///
/// Every response is returned to the caller, whatever its status. A status of
/// 400 or above decodes into the entity's `RestException`; check it with
/// [`Response::exception`] or use [`Client::execute_checked`]. Transport
/// failures are returned as [`Error::Network`] or [`Error::Timeout`].
///
/// # Examples
///
/// ```no_run
/// use twilio_rest::{CallOptions, Client};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), twilio_rest::Error> {
/// let client = Client::builder()
///     .account_sid("ACXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX")
///     .auth_token("your_auth_token")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let options = CallOptions {
///     from: Some("+15017122661".to_string()),
///     to: Some("+15558675310".to_string()),
///     url: Some("http://demo.twilio.com/docs/voice.xml".to_string()),
///     ..Default::default()
/// };
/// let call = client.initiate_outbound_call(&options).await?;
/// if let Some(exception) = call.exception() {
///     eprintln!("Call rejected: {}", exception);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    executor: Executor,
    api_version: String,
    proxy: RwLock<Option<Url>>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Executes a request and decodes the response into `T`.
    ///
    /// Decoding is scoped to the request's root element when it has one.
    ///
    /// # Errors
    ///
    /// - [`Error::UnboundSegment`] if a placeholder has no value, or
    ///   [`Error::InvalidSegment`] if it is bound to `.` or `..`; nothing is sent.
    /// - [`Error::Network`] or [`Error::Timeout`] if the round trip failed.
    /// - [`Error::DeserializationFailed`] if the body does not fit `T`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use twilio_rest::{Client, RestRequest};
    /// use http::Method;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// #[serde(rename_all = "PascalCase")]
    /// struct Account { friendly_name: String }
    ///
    /// # async fn example() -> Result<(), twilio_rest::Error> {
    /// let client = Client::builder()
    ///     .account_sid("AC123")
    ///     .auth_token("secret")
    ///     .build()?;
    ///
    /// let request = RestRequest::new(Method::GET)
    ///     .with_resource("Accounts/{AccountSid}")
    ///     .with_root_element("Account");
    /// let account = client.execute::<Account>(request).await?;
    /// println!("{}", account.data.friendly_name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<T>(&self, request: RestRequest) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        self.inner.executor.execute(request).await
    }

    /// Like [`Client::execute`], but an embedded `RestException` becomes
    /// [`Error::Api`].
    pub async fn execute_checked<T>(&self, request: RestRequest) -> Result<Response<T>>
    where
        T: ApiResource,
    {
        self.execute::<T>(request).await?.error_for_exception()
    }

    /// Executes a request without normalizing or decoding the response.
    pub async fn execute_raw(&self, request: RestRequest) -> Result<RawResponse> {
        let (raw, _latency) = self.inner.executor.dispatch(&request).await?;
        Ok(raw)
    }

    /// The versioned base URL that resource paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.executor.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.inner.api_version
    }

    /// The account sid used for authentication.
    pub fn account_sid(&self) -> &str {
        self.inner.executor.credentials.account_sid()
    }

    /// The value bound to `{AccountSid}` when a request does not bind it.
    pub fn account_resource_sid(&self) -> Option<&str> {
        self.inner
            .executor
            .default_segments
            .get(ACCOUNT_SID_SEGMENT)
            .map(String::as_str)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.inner.executor.timeout
    }

    pub fn date_format(&self) -> &str {
        self.inner.executor.decoder.date_format()
    }

    /// The `User-Agent` header sent with every request.
    pub fn user_agent(&self) -> Option<&str> {
        self.inner
            .executor
            .default_headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
    }

    pub fn proxy(&self) -> Option<Url> {
        self.inner
            .proxy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Routes subsequent requests through `proxy`, or directly when `None`.
    ///
    /// Requests already in flight are not affected. Changing the proxy while
    /// other tasks are dispatching through this client is a race the caller
    /// must avoid.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the transport rejects it.
    pub fn set_proxy(&self, proxy: Option<&str>) -> Result<()> {
        let proxy = proxy.map(Url::parse).transpose()?;
        self.inner.executor.transport.set_proxy(proxy.as_ref())?;
        *self
            .inner
            .proxy
            .write()
            .unwrap_or_else(PoisonError::into_inner) = proxy;
        Ok(())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url().as_str())
            .field("account_sid", &self.account_sid())
            .field("timeout", &self.timeout())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Only the account sid and auth token are required.
///
/// # Examples
///
/// ```no_run
/// use twilio_rest::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), twilio_rest::Error> {
/// let client = ClientBuilder::new()
///     .account_sid("ACparent")
///     .auth_token("secret")
///     .account_resource_sid("ACsubaccount")
///     .base_url("https://api.twilio.com")?
///     .api_version("2010-04-01")
///     .proxy("http://proxy.internal:3128")?
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    account_sid: Option<String>,
    auth_token: Option<SecretString>,
    account_resource_sid: Option<String>,
    base_url: String,
    api_version: String,
    default_headers: HeaderMap,
    proxy: Option<Url>,
    timeout: Option<Duration>,
    user_agent: String,
    date_format: String,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            account_resource_sid: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            default_headers: base_headers(),
            proxy: None,
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            transport: None,
        }
    }

    /// Sets the account sid used for authentication.
    pub fn account_sid(mut self, account_sid: impl Into<String>) -> Self {
        self.account_sid = Some(account_sid.into());
        self
    }

    /// Sets the auth token used for authentication.
    pub fn auth_token(mut self, auth_token: impl Into<SecretString>) -> Self {
        self.auth_token = Some(auth_token.into());
        self
    }

    /// Sets the account that `{AccountSid}` resolves to by default.
    ///
    /// Defaults to the authenticating account. A request can still target
    /// another account by binding `AccountSid` itself.
    pub fn account_resource_sid(mut self, sid: impl Into<String>) -> Self {
        self.account_resource_sid = Some(sid.into());
        self
    }

    /// Sets the API host.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Url::parse(url.as_ref())?.into();
        Ok(self)
    }

    /// Sets the API version appended to the base URL.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Routes requests through an HTTP proxy.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn proxy(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.proxy = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Removes the request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Replaces the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the chrono format used to decode date fields.
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Dispatches through `transport` instead of the default `reqwest` one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the account sid or auth token is missing, or if
    /// the configuration is invalid.
    pub fn build(self) -> Result<Client> {
        let account_sid = self
            .account_sid
            .ok_or_else(|| Error::ConfigurationError("Account sid is required".to_string()))?;
        let auth_token = self
            .auth_token
            .ok_or_else(|| Error::ConfigurationError("Auth token is required".to_string()))?;

        let credentials = Credentials::new(account_sid, auth_token);
        // Reject malformed credentials up front.
        credentials.to_header()?;

        let base_url = versioned_base_url(&self.base_url, &self.api_version)?;

        let mut default_headers = self.default_headers;
        let user_agent = HeaderValue::try_from(self.user_agent.as_str())
            .map_err(|e| Error::ConfigurationError(format!("Invalid user agent: {}", e)))?;
        default_headers.insert(USER_AGENT, user_agent);

        let mut default_segments = UrlSegments::new();
        let account_resource_sid = self
            .account_resource_sid
            .unwrap_or_else(|| credentials.account_sid().to_string());
        default_segments.insert(ACCOUNT_SID_SEGMENT.to_string(), account_resource_sid);

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => {
                if self.proxy.is_some() {
                    transport.set_proxy(self.proxy.as_ref())?;
                }
                transport
            }
            None => Arc::new(ReqwestTransport::with_proxy(self.proxy.as_ref())?),
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                executor: Executor {
                    transport,
                    base_url,
                    credentials,
                    default_headers,
                    default_segments,
                    timeout: self.timeout,
                    decoder: Decoder::new(self.date_format),
                },
                api_version: self.api_version,
                proxy: RwLock::new(self.proxy),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
