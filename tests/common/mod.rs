#![allow(dead_code)]

use ldsorg_client::{LdsClient, LdsClientBuilder};
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const UNIT: &str = "123456";
pub const SESSION_COOKIE: &str = "ObSSOCookie=test-token";
pub const SIGN_IN_BODY: &str = "username=test-user&password=test-password";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Bootstrap document in the shape LDS Tools publishes, pointing at `base`.
pub fn config_document(base: &str) -> Value {
    json!({
        "auth-url": format!("{base}/login"),
        "signout-url": format!("{base}/signout"),
        "current-user-unit": format!("{base}/current-user-unit"),
        "current-user-id": format!("{base}/current-user-id"),
        "stake-units": format!("{base}/stake-units"),
        "unit-membership": format!("{base}/unit-membership/%@"),
        "membership-record": format!("{base}/membership-record/%@"),
        "photo-url": format!("{base}/photo/url/%@/%@"),
        "callings": format!("{base}/callings/unit/%@/%d"),
        "cal2x-events": format!("{base}/calendar/events?start=%.0f&end=%.0f"),
        "members-moved-in": format!("{base}/moved-in?unitNumber=%@&months=%@"),
        "version": "3.4.1",
        "sync-enabled": true,
        "max-photo-size": 2048
    })
}

pub async fn mount_config(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(config_document(&server.uri())))
        .mount(server)
        .await;
}

pub async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(SIGN_IN_BODY))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("etag", "\"signed-in\"")
                .insert_header("set-cookie", format!("{SESSION_COOKIE}; Path=/").as_str()),
        )
        .mount(server)
        .await;
}

pub async fn mount_current_unit(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/current-user-unit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": UNIT })))
        .mount(server)
        .await;
}

pub async fn mount_sign_out(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/signout"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// Builder pointed at the mock server's bootstrap document, without
/// credentials.
pub fn builder(server: &MockServer) -> LdsClientBuilder {
    LdsClient::builder().config_url(format!("{}/config.json", server.uri()))
}

/// Builder carrying the credentials accepted by [`mount_sign_in`].
pub fn builder_with_credentials(server: &MockServer) -> LdsClientBuilder {
    builder(server).username("test-user").password("test-password")
}

/// Mounts discovery and sign-in, then returns a signed-in client.
pub async fn setup_signed_in_client(server: &MockServer) -> LdsClient {
    init_logging();
    mount_config(server).await;
    mount_sign_in(server).await;
    builder_with_credentials(server)
        .build()
        .await
        .expect("Failed to build LdsClient")
}

/// Number of requests the server has seen for `request_path`.
pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("failed to read recorded requests")
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
