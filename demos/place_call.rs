//! Places an outbound call, then fetches it with both executors.
//!
//! Credentials are read from the environment:
//!
//! ```text
//! TWILIO_ACCOUNT_SID=AC... TWILIO_AUTH_TOKEN=... \
//! CALL_FROM=+15017122661 CALL_TO=+15558675310 \
//! cargo run --example place_call
//! ```

use std::env;
use twilio_rest::{CallOptions, Client, Error, RestApi};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("twilio_rest=debug,place_call=info")
        .init();

    let account_sid = env::var("TWILIO_ACCOUNT_SID").unwrap_or_default();
    let auth_token = env::var("TWILIO_AUTH_TOKEN").unwrap_or_default();

    let client = Client::builder()
        .account_sid(&account_sid)
        .auth_token(auth_token.as_str())
        .build()?;

    println!("=== Placing a call ===");
    let options = CallOptions {
        from: env::var("CALL_FROM").ok(),
        to: env::var("CALL_TO").ok(),
        url: Some("http://demo.twilio.com/docs/voice.xml".to_string()),
        status_callback_events: vec!["initiated".to_string(), "completed".to_string()],
        timeout: Some(20),
        ..Default::default()
    };
    let placed = client.initiate_outbound_call(&options).await?;

    if let Some(exception) = placed.exception() {
        println!("Call rejected (HTTP {}): {}", placed.status, exception);
        return Ok(());
    }

    let call_sid = placed.data.sid.clone().unwrap_or_default();
    println!("Placed call {} in {:?}", call_sid, placed.latency);
    println!();

    println!("=== Fetching with the persistent client ===");
    let fetched = client.get_call(&call_sid).await?.error_for_exception()?;
    println!("Status: {}", fetched.data.status);
    println!("Created: {:?}", fetched.data.date_created);
    println!();

    println!("=== Fetching with the one-shot executor ===");
    let api = RestApi::new(account_sid, auth_token);
    match api.get_call(&call_sid).await {
        Ok(call) => println!("Duration: {}s", call.duration),
        Err(e) => {
            let cause = std::error::Error::source(&e).map(ToString::to_string);
            println!("{} ({})", e, cause.unwrap_or_default());
        }
    }

    Ok(())
}
