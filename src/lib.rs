//! # twilio-rest - An authenticated client for the Twilio REST API
//!
//! Every call goes through the same pipeline: a [`RestRequest`] describes the
//! method, the resource template and its parameters; the executor binds the
//! account placeholder, authenticates the request with HTTP Basic credentials,
//! dispatches it through a [`Transport`], rewrites error responses into a
//! uniform `{"RestException": ...}` envelope, and decodes the result into a
//! typed entity.
//!
//! Two executors share that pipeline:
//!
//! - [`Client`] is built once with full session configuration and reused. It
//!   returns every response, including API errors, as a [`Response`].
//! - [`RestApi`] needs only credentials, connects a fresh transport per call,
//!   and wraps every failure after validation in [`Error::Application`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use twilio_rest::{CallOptions, Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), twilio_rest::Error> {
//!     let client = Client::builder()
//!         .account_sid("ACXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX")
//!         .auth_token("your_auth_token")
//!         .build()?;
//!
//!     let options = CallOptions {
//!         from: Some("+15017122661".to_string()),
//!         to: Some("+15558675310".to_string()),
//!         url: Some("http://demo.twilio.com/docs/voice.xml".to_string()),
//!         ..Default::default()
//!     };
//!     let placed = client.initiate_outbound_call(&options).await?;
//!
//!     let call = client.get_call(placed.data.sid.unwrap_or_default()).await?;
//!     match call.exception() {
//!         Some(exception) => eprintln!("API error {}: {}", call.status, exception),
//!         None => println!("Call lasted {}s", call.data.duration),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Validation failures are reported before anything is sent. Transport
//! failures are never retried. API errors decode into the entity; callers who
//! prefer them as `Err` use the checking adapter:
//!
//! ```no_run
//! use twilio_rest::{resources::calls, Call, Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().account_sid("AC1").auth_token("t").build()?;
//! match client.execute_checked::<Call>(calls::get_call_request("CA123")).await {
//!     Ok(response) => println!("Status: {}", response.data.status),
//!     Err(Error::Api { status, exception }) => eprintln!("HTTP {}: {}", status, exception),
//!     Err(e) if e.is_transport() => eprintln!("Could not reach the API: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod decode;
mod envelope;
mod ephemeral;
mod error;
mod executor;
mod request;
pub mod resources;
mod response;
pub mod transport;

pub use auth::{Credentials, SecretString};
pub use client::{
    Client, ClientBuilder, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT,
};
pub use decode::{Decoder, DEFAULT_DATE_FORMAT};
pub use envelope::{ApiResource, ErrorEnvelope, NormalizedResponse, RestException};
pub use ephemeral::{RestApi, LEGACY_API_VERSION};
pub use error::{Error, Result, APPLICATION_ERROR_MESSAGE};
pub use request::{RestRequest, UrlSegments};
pub use resources::calls::{Call, CallOptions};
pub use response::Response;
pub use transport::{Connect, HttpRequest, RawResponse, ReqwestConnector, ReqwestTransport, Transport};

pub use http::Method;
