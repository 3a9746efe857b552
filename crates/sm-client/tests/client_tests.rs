//! End-to-end client tests against a mocked Service Manager and issuer.
//!
//! One wiremock server plays both roles: `/v1/...` is the Service Manager,
//! `/uaa/...` is the OpenID provider advertised by `/v1/info`.

use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sm_client::auth::{Options, ProviderMetadata, Token, TokenExchange, TokenSource};
use sm_client::models::{LabelChanges, LabelOperation, Platform};
use sm_client::{ClientError, Config, Parameters, ServiceManagerClient, TokenError};

async fn mount_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_issuer_url": format!("{}/uaa", server.uri()),
            "token_basic_auth": true,
        })))
        .mount(server)
        .await;
}

async fn mount_discovery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/uaa/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": format!("{}/uaa", server.uri()),
            "authorization_endpoint": format!("{}/uaa/oauth/authorize", server.uri()),
            "token_endpoint": format!("{}/uaa/oauth/token", server.uri()),
        })))
        .mount(server)
        .await;
}

fn token_response(access_token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
    }))
}

async fn mount_token(server: &MockServer, access_token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/uaa/oauth/token"))
        .respond_with(token_response(access_token))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Server with info and discovery in place; token endpoint left to the test.
async fn setup() -> MockServer {
    let server = MockServer::start().await;
    mount_info(&server).await;
    mount_discovery(&server).await;
    server
}

async fn connect(server: &MockServer) -> ServiceManagerClient {
    ServiceManagerClient::connect(&Config::for_testing(&server.uri()), None).await.unwrap()
}

// =============================================================================
// Connect
// =============================================================================

#[tokio::test]
async fn test_connect_requests_no_token() {
    let server = setup().await;
    mount_token(&server, "unused", 0).await;

    let client = connect(&server).await;
    assert!(client.is_authenticated());
    server.verify().await;
}

#[tokio::test]
async fn test_connect_fails_when_discovery_is_not_ok() {
    let server = MockServer::start().await;
    mount_info(&server).await;

    Mock::given(method("GET"))
        .and(path("/uaa/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = ServiceManagerClient::connect(&Config::for_testing(&server.uri()), None).await;

    match result {
        Err(ClientError::Discovery { url, .. }) => {
            assert!(url.ends_with("/uaa/.well-known/openid-configuration"));
        }
        other => panic!("expected discovery error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_fails_when_info_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/info"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = ServiceManagerClient::connect(&Config::for_testing(&server.uri()), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn test_unauthenticated_client_sends_no_authorization() {
    let server = setup().await;

    let client = ServiceManagerClient::unauthenticated(&Config::for_testing(&server.uri())).unwrap();
    let info = client.get_info(None).await.unwrap();

    assert!(!client.is_authenticated());
    assert!(client.token().await.unwrap().is_none());
    assert!(info.token_issuer_url.ends_with("/uaa"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| request.headers.get("authorization").is_none()));
}

// =============================================================================
// Authenticated Calls
// =============================================================================

#[tokio::test]
async fn test_calls_carry_bearer_token_from_single_exchange() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/platforms"))
        .and(header("authorization", "Bearer at-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "platforms": [{"id": "p1", "name": "cf-eu", "type": "cloudfoundry"}]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    for _ in 0..3 {
        let platforms = client.list_platforms(None).await.unwrap();
        assert_eq!(platforms.platforms[0].platform_type, "cloudfoundry");
    }
    server.verify().await;
}

#[tokio::test]
async fn test_seed_with_refresh_token_renews_through_refresh_grant() {
    let server = setup().await;

    Mock::given(method("POST"))
        .and(path("/uaa/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(token_response("refreshed"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/service_brokers"))
        .and(header("authorization", "Bearer refreshed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"brokers": []})))
        .mount(&server)
        .await;

    let seed = Token::bearer("stale", Some(Utc::now() - chrono::Duration::minutes(1)))
        .with_refresh_token("rt-1");
    let client =
        ServiceManagerClient::connect(&Config::for_testing(&server.uri()), Some(seed)).await.unwrap();

    let brokers = client.list_brokers(None).await.unwrap();
    assert!(brokers.brokers.is_empty());

    let token = client.token().await.unwrap().unwrap();
    assert_eq!(token.access_token, "refreshed");
    assert_eq!(token.refresh_token.as_deref(), Some("rt-1"));
    server.verify().await;
}

#[tokio::test]
async fn test_token_failure_surfaces_as_token_error() {
    let server = setup().await;

    Mock::given(method("POST"))
        .and(path("/uaa/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/platforms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"platforms": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.list_platforms(None).await.unwrap_err();

    match err {
        ClientError::Token(TokenError::Status { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected token error, got {other:?}"),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_unencodable_token_surfaces_as_invalid_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/platforms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"platforms": []})))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config::for_testing(&server.uri());
    let options = Options {
        issuer_url: format!("{}/uaa", server.uri()),
        client_id: config.client_id.clone(),
        client_secret: config.client_secret.clone(),
        ssl_disabled: false,
        timeout: config.timeout,
        token_basic_auth: true,
    };
    let metadata = ProviderMetadata {
        issuer: None,
        authorization_endpoint: format!("{}/uaa/oauth/authorize", server.uri()),
        token_endpoint: format!("{}/uaa/oauth/token", server.uri()),
    };
    let exchange = TokenExchange::new(reqwest::Client::new(), &options, &metadata).unwrap();
    let seed = Token::bearer("bad\ntoken", None);
    let client =
        ServiceManagerClient::with_token_source(&config, TokenSource::select(exchange, Some(seed)))
            .unwrap();

    let err = client.list_platforms(None).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidHeader(_)), "got {err:?}");
    server.verify().await;
}

// =============================================================================
// Status Normalization
// =============================================================================

#[tokio::test]
async fn test_register_platform_created() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("POST"))
        .and(path("/v1/platforms"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "cf-eu", "type": "cloudfoundry"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p1",
            "name": "cf-eu",
            "type": "cloudfoundry",
            "credentials": {"basic": {"username": "u", "password": "p"}}
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let platform = client.register_platform(&Platform::new("cf-eu", "cloudfoundry"), None).await.unwrap();

    assert_eq!(platform.id, "p1");
    assert_eq!(platform.credentials.unwrap().basic.username, "u");
}

#[tokio::test]
async fn test_register_bad_request_carries_error_code() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("POST"))
        .and(path("/v1/platforms"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad_request"})))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.register_platform(&Platform::new("", ""), None).await.unwrap_err();

    let resource = err.resource_error().expect("resource error");
    assert_eq!(resource.status, 400);
    assert_eq!(resource.error.as_deref(), Some("bad_request"));
    assert_eq!(resource.description, None);
    assert_eq!(resource.url, format!("{}/v1/platforms", server.uri()));
}

#[tokio::test]
async fn test_unauthorized_carries_error_and_description() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/visibilities"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_token",
            "description": "expired"
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.list_visibilities(None).await.unwrap_err();

    let resource = err.resource_error().expect("resource error");
    assert!(resource.is_unauthorized());
    assert_eq!(resource.error.as_deref(), Some("invalid_token"));
    assert_eq!(resource.description.as_deref(), Some("expired"));
    assert_eq!(err.to_string(), format!(
        "request {}/v1/visibilities failed with status 401: invalid_token: expired",
        server.uri()
    ));
}

#[tokio::test]
async fn test_unparsable_error_body_keeps_status_and_url() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/platforms"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let query = Parameters::new().field("name = cf-eu");
    let err = client.list_platforms(Some(&query)).await.unwrap_err();

    let resource = err.resource_error().expect("resource error");
    assert_eq!(resource.status, 502);
    assert!(resource.is_server_error());
    assert!(resource.url.starts_with(&format!("{}/v1/platforms?", server.uri())));
    assert_eq!(resource.error, None);
    assert_eq!(resource.description, None);
}

#[tokio::test]
async fn test_unexpected_success_status_is_an_error() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("DELETE"))
        .and(path("/v1/service_brokers/b1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.delete_broker("b1", None).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NO_CONTENT));
}

#[tokio::test]
async fn test_error_after_redirect_reports_request_url() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/platforms"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/elsewhere"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "NotFound"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.list_platforms(None).await.unwrap_err();

    let resource = err.resource_error().expect("resource error");
    assert!(resource.is_not_found());
    assert_eq!(resource.url, format!("{}/v1/platforms", server.uri()));
    assert_eq!(resource.error.as_deref(), Some("NotFound"));
    server.verify().await;
}

// =============================================================================
// Operations
// =============================================================================

#[tokio::test]
async fn test_query_parameters_are_forwarded() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/platforms"))
        .and(query_param("fieldQuery", "name = cf-eu and type = cloudfoundry"))
        .and(query_param("labelQuery", "env = dev"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"platforms": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let query = Parameters::new()
        .field("name = cf-eu")
        .field("type = cloudfoundry")
        .label("env = dev")
        .param("page_size", "10");

    client.list_platforms(Some(&query)).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_list_offerings_attaches_plans_and_broker_name() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/service_offerings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service_offerings": [{"id": "o1", "name": "postgres", "broker_id": "b1"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/service_plans"))
        .and(query_param("fieldQuery", "service_offering_id = o1"))
        .and(query_param("region", "eu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service_plans": [
                {"id": "sp1", "name": "small", "service_offering_id": "o1"},
                {"id": "sp2", "name": "large", "service_offering_id": "o1"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/service_brokers/b1"))
        .and(query_param("region", "eu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "b1",
            "name": "db-broker",
            "broker_url": "https://broker.example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let query = Parameters::new().label("tier = gold").param("region", "eu");
    let offerings = client.list_offerings(Some(&query)).await.unwrap();

    let offering = &offerings.service_offerings[0];
    assert_eq!(offering.broker_name, "db-broker");
    assert_eq!(
        offering.plans.iter().map(|plan| plan.name.as_str()).collect::<Vec<_>>(),
        vec!["small", "large"]
    );
    server.verify().await;
}

#[tokio::test]
async fn test_delete_platform_by_id() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("DELETE"))
        .and(path("/v1/platforms/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    client.delete_platform("p1", None).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_delete_missing_visibility_is_not_found() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("DELETE"))
        .and(path("/v1/visibilities"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "NotFound",
            "description": "could not find such visibility"
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let query = Parameters::new().field("id = v1");
    let err = client.delete_visibilities(Some(&query)).await.unwrap_err();

    assert!(err.resource_error().is_some_and(|resource| resource.is_not_found()));
}

#[tokio::test]
async fn test_label_sends_patch_with_changes() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("PATCH"))
        .and(path("/v1/service_brokers/b1"))
        .and(body_json(json!({
            "labels": [{"op": "add_values", "key": "env", "values": ["dev", "test"]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "b1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let changes = LabelChanges::single(
        LabelOperation::AddValues,
        "env",
        vec!["dev".to_string(), "test".to_string()],
    );

    client.label("/v1/service_brokers", "b1", &changes, None).await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_update_platform_patches_by_id() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("PATCH"))
        .and(path("/v1/platforms/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "name": "renamed",
            "type": "kubernetes"
        })))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let updated =
        client.update_platform("p1", &Platform::new("renamed", "kubernetes"), None).await.unwrap();

    assert_eq!(updated.name, "renamed");
}

#[tokio::test]
async fn test_raw_call_returns_successful_response() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("PUT"))
        .and(path("/v1/custom"))
        .and(header("authorization", "Bearer at-1"))
        .and(body_json(json!({"key": "value"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"accepted": true})))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let response = client
        .call(Method::PUT, "/v1/custom", Some(&json!({"key": "value"})), None)
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 202);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["accepted"], true);
}

#[tokio::test]
async fn test_raw_call_normalizes_failure() {
    let server = setup().await;
    mount_token(&server, "at-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/v1/custom"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "forbidden"})))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client.call(Method::GET, "/v1/custom", None, None).await.unwrap_err();

    let resource = err.resource_error().expect("resource error");
    assert!(resource.is_forbidden());
    assert_eq!(resource.error.as_deref(), Some("forbidden"));
}
