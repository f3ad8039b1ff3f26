//! HTTP Basic credentials.

use crate::{Error, Result};
use base64::Engine;
use http::header::AUTHORIZATION;
use http::{HeaderName, HeaderValue};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that is wiped from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret in clear text.
    ///
    /// Only for building request headers; never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The account identifier and secret sent with every request.
#[derive(Clone, Debug)]
pub struct Credentials {
    account_sid: String,
    auth_token: SecretString,
}

impl Credentials {
    /// Pairs an account sid with its auth token.
    ///
    /// Nothing is validated here; see [`Credentials::to_header`].
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<SecretString>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
        }
    }

    /// The account sid sent as the Basic auth user name.
    pub fn account_sid(&self) -> &str {
        &self.account_sid
    }

    /// Builds the `Authorization: Basic <base64(sid:token)>` header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if the account sid contains a
    /// colon or the encoded value is not a valid header.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue)> {
        if self.account_sid.contains(':') {
            return Err(Error::ConfigurationError(
                "Account sid cannot contain colon (:) character".to_string(),
            ));
        }

        let mut pair = format!("{}:{}", self.account_sid, self.auth_token.expose());
        let encoded = base64::engine::general_purpose::STANDARD.encode(pair.as_bytes());
        pair.zeroize();

        let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|e| Error::ConfigurationError(format!("Invalid credentials: {}", e)))?;
        value.set_sensitive(true);
        Ok((AUTHORIZATION, value))
    }
}
