//! One-shot executor that builds a fresh transport for every call.

use crate::auth::{Credentials, SecretString};
use crate::decode::Decoder;
use crate::executor::{base_headers, versioned_base_url, Executor, ACCOUNT_SID_SEGMENT};
use crate::request::{RestRequest, UrlSegments};
use crate::transport::{Connect, ReqwestConnector};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// API version used by [`RestApi`].
pub const LEGACY_API_VERSION: &str = "2008-08-01";

/// A stateless executor configured with nothing but credentials.
///
/// Each call connects a new transport, binds `{AccountSid}` to the
/// authenticating account unless the request binds it, and returns only the
/// decoded entity. Any failure after validation, whether a transport failure
/// or an undecodable body, is wrapped in [`Error::Application`] with the
/// original error as its source. Validation failures are returned as-is, and a
/// status of 400 or above still decodes into the entity's `RestException`.
///
/// # Examples
///
/// ```no_run
/// use twilio_rest::RestApi;
///
/// # async fn example() -> Result<(), twilio_rest::Error> {
/// let api = RestApi::new("AC123", "secret");
/// let call = api.get_call("CA456").await?;
/// println!("{:?} lasted {}s", call.sid, call.duration);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RestApi {
    credentials: Credentials,
    base_url: String,
    api_version: String,
    connector: Arc<dyn Connect>,
}

impl RestApi {
    pub fn new(account_sid: impl Into<String>, secret_key: impl Into<SecretString>) -> Self {
        Self {
            credentials: Credentials::new(account_sid, secret_key),
            base_url: crate::client::DEFAULT_BASE_URL.to_string(),
            api_version: LEGACY_API_VERSION.to_string(),
            connector: Arc::new(ReqwestConnector),
        }
    }

    /// Points the executor at another host, keeping the legacy API version.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Connects transports through `connector` instead of `reqwest`.
    pub fn with_connector(mut self, connector: impl Connect + 'static) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    pub fn account_sid(&self) -> &str {
        self.credentials.account_sid()
    }

    /// Executes a request and returns the decoded entity.
    ///
    /// # Errors
    ///
    /// - [`Error::UnboundSegment`] if a placeholder has no value, or
    ///   [`Error::InvalidSegment`] if it is bound to `.` or `..`; nothing is sent.
    /// - [`Error::Application`] wrapping any other failure.
    pub async fn execute<T>(&self, request: RestRequest) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let executor = self.executor()?;
        match executor.execute::<T>(request).await {
            Ok(response) => Ok(response.data),
            Err(e) if e.is_validation() => Err(e),
            Err(e) => Err(Error::application(e)),
        }
    }

    fn executor(&self) -> Result<Executor> {
        let base_url = versioned_base_url(&self.base_url, &self.api_version)?;
        let transport = self.connector.connect().map_err(Error::application)?;

        let mut default_segments = UrlSegments::new();
        default_segments.insert(
            ACCOUNT_SID_SEGMENT.to_string(),
            self.credentials.account_sid().to_string(),
        );

        Ok(Executor {
            transport,
            base_url,
            credentials: self.credentials.clone(),
            default_headers: base_headers(),
            default_segments,
            timeout: None,
            decoder: Decoder::default(),
        })
    }
}

impl std::fmt::Debug for RestApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestApi")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}
