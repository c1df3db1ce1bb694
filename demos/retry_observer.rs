//! Shows retry notifications against a local server that fails twice
//! before answering.
//!
//! Run with: `cargo run --example retry_observer`

use reqres_client::{Client, Error, ExternalUserService, ReqresApiClient, RetryPolicy, UserService};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("reqres_client=info")
        .init();

    let server = MockServer::start().await;
    let calls = AtomicUsize::new(0);

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "1"))
        .respond_with(move |_req: &wiremock::Request| {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({
                    "page": 1,
                    "data": [{
                        "id": 1,
                        "first_name": "George",
                        "last_name": "Bluth",
                        "email": "george.bluth@reqres.in"
                    }]
                }))
            }
        })
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 2, "data": [] })))
        .mount(&server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/api/", server.uri()))?
        .api_key("demo")?
        .retry_policy(RetryPolicy::fixed(3, Duration::from_millis(500)))
        .on_retry(|event| {
            println!(
                "Retry {} after {:?} due to {}",
                event.attempt, event.delay, event.error
            );
        })
        .build()?;

    let service = ExternalUserService::new(ReqresApiClient::new(client));
    let users = service.get_all_users().await?;
    println!("Fetched {} user(s)", users.len());

    Ok(())
}
