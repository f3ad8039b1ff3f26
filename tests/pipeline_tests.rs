//! Pipeline tests using in-process transports instead of a network.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use twilio_rest::{
    resources::calls, Call, CallOptions, Client, Connect, Error, HttpRequest, Method,
    RawResponse, RestApi, RestRequest, Result, Transport, APPLICATION_ERROR_MESSAGE,
};
use url::Url;

enum Reply {
    Respond(u16, String),
    TimedOut,
}

/// Answers every request the same way and records what it was sent.
struct StubTransport {
    reply: Reply,
    calls: AtomicUsize,
    last_request: Mutex<Option<HttpRequest>>,
    proxy: Mutex<Option<Url>>,
}

impl StubTransport {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            proxy: Mutex::new(None),
        })
    }

    fn responding(status: u16, body: impl Into<String>) -> Arc<Self> {
        Self::new(Reply::Respond(status, body.into()))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_url(&self) -> String {
        self.last_request
            .lock()
            .unwrap()
            .as_ref()
            .map(|request| request.url.to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);

        match &self.reply {
            Reply::Respond(status, body) => Ok(RawResponse::new(
                http::StatusCode::from_u16(*status).unwrap(),
                body.clone(),
            )),
            Reply::TimedOut => Err(Error::Timeout),
        }
    }

    fn set_proxy(&self, proxy: Option<&Url>) -> Result<()> {
        *self.proxy.lock().unwrap() = proxy.cloned();
        Ok(())
    }
}

#[derive(Clone)]
struct StubConnector {
    transport: Arc<StubTransport>,
    connects: Arc<AtomicUsize>,
}

impl StubConnector {
    fn new(transport: Arc<StubTransport>) -> Self {
        Self {
            transport,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Connect for StubConnector {
    fn connect(&self) -> Result<Arc<dyn Transport>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.transport.clone())
    }
}

fn client(transport: Arc<StubTransport>) -> Client {
    Client::builder()
        .account_sid("ACtest")
        .auth_token("token")
        .base_url("https://api.example.com")
        .unwrap()
        .transport(transport)
        .build()
        .unwrap()
}

fn rest_api(transport: Arc<StubTransport>) -> (RestApi, StubConnector) {
    let connector = StubConnector::new(transport);
    let api = RestApi::new("ACtest", "token")
        .with_base_url("https://api.example.com")
        .with_connector(connector.clone());
    (api, connector)
}

#[tokio::test]
async fn test_success_decodes_scoped_entity() {
    let transport = StubTransport::responding(200, r#"{"Call":{"Sid":"CA123","Duration":10}}"#);
    let response = client(transport.clone()).get_call("CA123").await.unwrap();

    assert_eq!(response.data.sid.as_deref(), Some("CA123"));
    assert_eq!(response.data.duration, 10);
    assert!(response.data.rest_exception.is_none());
    assert_eq!(
        transport.last_url(),
        "https://api.example.com/2010-04-01/Accounts/ACtest/Calls/CA123"
    );
}

#[tokio::test]
async fn test_in_progress_call_with_null_price_decodes() {
    let transport = StubTransport::responding(
        200,
        r#"{"Call":{"Sid":"CA1","Status":1,"Duration":null,"Price":null}}"#,
    );

    let response = client(transport.clone()).get_call("CA1").await.unwrap();
    assert_eq!(response.data.sid.as_deref(), Some("CA1"));
    assert_eq!(response.data.status, 1);
    assert_eq!(response.data.duration, 0);
    assert_eq!(response.data.price, 0.0);

    let (api, _) = rest_api(transport);
    let call = api.get_call("CA1").await.unwrap();
    assert_eq!(call.price, 0.0);
}

#[tokio::test]
async fn test_dot_segment_is_rejected_before_dispatch() {
    let transport = StubTransport::responding(200, "{}");

    for sid in [".", ".."] {
        let result = client(transport.clone()).get_call(sid).await;
        assert!(
            matches!(result, Err(Error::InvalidSegment { ref name, .. }) if name == "CallSid"),
            "got {:?}",
            result
        );

        let (api, _) = rest_api(transport.clone());
        let result = api.get_call(sid).await;
        assert!(matches!(result, Err(Error::InvalidSegment { .. })));
    }

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_not_found_is_returned_with_exception() {
    let transport = StubTransport::responding(404, r#"{"Message":"not found"}"#);
    let response = client(transport).get_call("CA404").await.unwrap();

    assert_eq!(response.status.as_u16(), 404);
    let exception = response.exception().unwrap();
    assert_eq!(
        serde_json::to_value(exception).unwrap(),
        json!({"Message": "not found"})
    );
}

#[tokio::test]
async fn test_envelope_is_applied_once_per_response() {
    let transport = StubTransport::responding(400, r#"{"Message":"bad"}"#);
    let client = client(transport.clone());

    for _ in 0..3 {
        let response = client.get_call("CA1").await.unwrap();
        assert_eq!(response.raw_body, r#"{"RestException":{"Message":"bad"}}"#);
    }
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_decode_round_trips_serialized_entity() {
    let call = Call {
        sid: Some("CA123".to_string()),
        duration: 42,
        price: 0.0,
        status: 2,
        ..Default::default()
    };
    let body = serde_json::to_string(&json!({ "Call": call })).unwrap();

    let transport = StubTransport::responding(200, body);
    let response = client(transport).get_call("CA123").await.unwrap();

    assert_eq!(response.data, call);
}

#[tokio::test]
async fn test_missing_url_is_rejected_before_dispatch() {
    let transport = StubTransport::responding(201, "{}");

    let result = client(transport.clone())
        .initiate_outbound_call(&CallOptions::default())
        .await;
    assert!(matches!(result, Err(Error::Validation { ref field }) if field == "Url"));

    let (api, connector) = rest_api(transport.clone());
    let result = api.initiate_outbound_call(&CallOptions::default()).await;
    assert!(matches!(result, Err(Error::Validation { ref field }) if field == "Url"));

    assert_eq!(transport.calls(), 0);
    assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unbound_segment_is_rejected_before_dispatch() {
    let transport = StubTransport::responding(200, "{}");
    let request = RestRequest::new(Method::GET).with_resource("Accounts/{AccountSid}/Calls/{CallSid}");

    let result = client(transport.clone()).execute::<Call>(request.clone()).await;
    assert!(matches!(result, Err(Error::UnboundSegment { ref name }) if name == "CallSid"));

    let (api, _) = rest_api(transport.clone());
    let result = api.execute::<Call>(request).await;
    assert!(matches!(result, Err(Error::UnboundSegment { ref name }) if name == "CallSid"));

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_persistent_client_propagates_transport_failure() {
    let transport = StubTransport::new(Reply::TimedOut);
    let result = client(transport).get_call("CA1").await;

    assert!(matches!(result, Err(Error::Timeout)));
}

#[tokio::test]
async fn test_ephemeral_wraps_transport_failure() {
    let (api, _) = rest_api(StubTransport::new(Reply::TimedOut));

    match api.get_call("CA1").await {
        Err(err @ Error::Application { .. }) => {
            assert_eq!(err.to_string(), APPLICATION_ERROR_MESSAGE);
            assert!(err.is_transport());
            let source = std::error::Error::source(&err).unwrap();
            assert_eq!(source.to_string(), Error::Timeout.to_string());
        }
        other => panic!("Expected Application error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ephemeral_wraps_undecodable_body() {
    let (api, _) = rest_api(StubTransport::responding(200, "<Call/>"));

    match api.get_call("CA1").await {
        Err(Error::Application { source, .. }) => {
            assert!(matches!(*source, Error::DeserializationFailed { .. }));
        }
        other => panic!("Expected Application error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ephemeral_decodes_api_error_into_entity() {
    let transport = StubTransport::responding(404, r#"{"Status":404,"Message":"not found"}"#);
    let (api, _) = rest_api(transport.clone());

    let call = api.get_call("CA1").await.unwrap();

    assert!(call.sid.is_none());
    assert_eq!(call.rest_exception.unwrap().status, Some(404));
    assert_eq!(
        transport.last_url(),
        "https://api.example.com/2008-08-01/Accounts/ACtest/Calls/CA1"
    );
}

#[tokio::test]
async fn test_ephemeral_connects_per_call() {
    let transport = StubTransport::responding(200, r#"{"Call":{"Sid":"CA1"}}"#);
    let (api, connector) = rest_api(transport.clone());

    api.get_call("CA1").await.unwrap();
    api.get_call("CA1").await.unwrap();

    assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_request_binding_wins_over_account_default() {
    let transport = StubTransport::responding(200, r#"{"Call":{}}"#);
    let client = client(transport.clone());

    let request = calls::get_call_request("CA1").with_url_segment("AccountSid", "ACsub");
    client.execute::<Call>(request).await.unwrap();

    assert_eq!(
        transport.last_url(),
        "https://api.example.com/2010-04-01/Accounts/ACsub/Calls/CA1"
    );
    assert_eq!(client.account_resource_sid(), Some("ACtest"));
}

#[tokio::test]
async fn test_initiate_sends_form_body() {
    let transport = StubTransport::responding(201, r#"{"Sid":"CA9"}"#);
    let options = CallOptions {
        to: Some("+15558675310".to_string()),
        url: Some("http://example.com/twiml".to_string()),
        status_callback_events: vec!["initiated".to_string(), "answered".to_string()],
        record: true,
        ..Default::default()
    };

    let response = client(transport.clone())
        .initiate_outbound_call(&options)
        .await
        .unwrap();
    assert_eq!(response.data.sid.as_deref(), Some("CA9"));

    let request = transport.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.method, Method::POST);
    assert!(request.url.query().is_none());
    assert_eq!(
        request.body.as_deref(),
        Some("To=%2B15558675310&Url=http%3A%2F%2Fexample.com%2Ftwiml&StatusCallbackEvent=initiated&StatusCallbackEvent=answered&Record=true")
    );
}

#[tokio::test]
async fn test_set_proxy_reaches_transport() {
    let transport = StubTransport::responding(200, "{}");
    let client = client(transport.clone());

    client.set_proxy(Some("http://proxy.internal:3128")).unwrap();
    assert_eq!(
        transport.proxy.lock().unwrap().as_ref().map(Url::as_str),
        Some("http://proxy.internal:3128/")
    );
    assert_eq!(client.proxy().unwrap().host_str(), Some("proxy.internal"));

    client.set_proxy(None).unwrap();
    assert!(transport.proxy.lock().unwrap().is_none());
    assert!(client.proxy().is_none());
}

#[tokio::test]
async fn test_invalid_proxy_leaves_setting_unchanged() {
    let client = client(StubTransport::responding(200, "{}"));

    assert!(matches!(
        client.set_proxy(Some("not a url")),
        Err(Error::InvalidUrl(_))
    ));
    assert!(client.proxy().is_none());
}

#[tokio::test]
async fn test_concurrent_requests_share_client() {
    let transport = StubTransport::responding(200, r#"{"Call":{"Sid":"CA1"}}"#);
    let client = client(transport.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_call("CA1").await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.data.sid.as_deref(), Some("CA1"));
    }
    assert_eq!(transport.calls(), 8);
}

#[test]
fn test_builder_requires_credentials() {
    let missing_sid = Client::builder().auth_token("token").build();
    assert!(matches!(missing_sid, Err(Error::ConfigurationError(_))));

    let missing_token = Client::builder().account_sid("ACtest").build();
    assert!(matches!(missing_token, Err(Error::ConfigurationError(_))));

    let colon_sid = Client::builder().account_sid("AC:bad").auth_token("token").build();
    assert!(matches!(colon_sid, Err(Error::ConfigurationError(_))));
}

#[test]
fn test_builder_defaults() {
    let client = client(StubTransport::responding(200, "{}"));

    assert_eq!(client.base_url().as_str(), "https://api.example.com/2010-04-01/");
    assert_eq!(client.api_version(), twilio_rest::DEFAULT_API_VERSION);
    assert_eq!(client.timeout(), Some(twilio_rest::DEFAULT_TIMEOUT));
    assert_eq!(client.date_format(), twilio_rest::DEFAULT_DATE_FORMAT);
    assert_eq!(client.user_agent(), Some(twilio_rest::DEFAULT_USER_AGENT));
    assert_eq!(client.account_sid(), "ACtest");
}
