//! Integration tests for `SDataService`.
//!
//! These tests run the service against a wiremock server and verify URL
//! construction, authentication, status handling and error translation.

use std::cell::Cell;

use sdata::service::{with_completion, GENERIC_SERVER_ERROR_HINT, GENERIC_SERVER_ERROR_PREFIX};
use sdata::{ConfigError, QueryOptions, Record, SDataError, SDataService};
use serde_json::{json, Map};
use wiremock::matchers::{body_json, header, header_exists, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a service pointing at `/sdata/` on the mock server, as `admin`.
fn create_service(server: &MockServer) -> SDataService {
    SDataService::new(&format!("{}/sdata", server.uri()), Some("admin"), Some("")).unwrap()
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_read_sends_filter_and_options() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sdata/accounts"))
        .and(query_param("format", "json"))
        .and(query_param("where", "AccountName like 'A%'"))
        .and(query_param("select", "AccountName"))
        .and(query_param("count", "10"))
        .and(header("Accept", "application/json"))
        .and(header("Authorization", "Basic YWRtaW46"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "$totalResults": 2,
            "$startIndex": 1,
            "$itemsPerPage": 10,
            "$resources": [
                { "$key": "A1", "AccountName": "Abbott Ltd." },
                { "$key": "A2", "AccountName": "Allied Corp." }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let page = service
        .read(
            "accounts",
            "AccountName like 'A%'",
            &QueryOptions::new().select("AccountName").count(10),
        )
        .await
        .unwrap();

    assert_eq!(page.total_results, Some(2));
    assert!(page.is_last_page());
    assert_eq!(page.resources.len(), 2);
    assert_eq!(page.resources[0].key().as_deref(), Some("A1"));
    assert_eq!(page.resources[1]["AccountName"], "Allied Corp.");
    assert!(page.resources.iter().all(|r| r.get("Type").is_none()));

    // Spaces must reach the server as %20, never '+'
    let requests = mock_server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap();
    assert!(query.contains("AccountName%20like%20"));
    assert!(!query.contains('+'));
}

#[tokio::test]
async fn test_read_where_option_overrides_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sdata/accounts"))
        .and(query_param("where", "Type eq 'Customer'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "$resources": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let page = service
        .read(
            "accounts",
            "AccountName like 'A%'",
            &QueryOptions::new().where_clause("Type eq 'Customer'"),
        )
        .await
        .unwrap();

    assert!(page.resources.is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap().contains("AccountName"));
}

#[tokio::test]
async fn test_read_rejects_non_listing_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<feed/>"))
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let result = service.read("accounts", "", &QueryOptions::new()).await;

    assert!(matches!(result, Err(SDataError::Deserialize { .. })));
}

// ============================================================================
// Create / Update / Delete
// ============================================================================

#[tokio::test]
async fn test_create_then_delete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sdata/accounts"))
        .and(query_param("format", "json"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "AccountName": "Foo Inc." })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "$key": "AGHEA0002669",
            "AccountName": "Foo Inc."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path_regex(r#"^/sdata/accounts\((%22|")AGHEA0002669(%22|")\)$"#))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let created = service
        .create("accounts", &Record::new().with("AccountName", "Foo Inc."))
        .await
        .unwrap();

    let key = created.key().unwrap();
    assert_eq!(key, "AGHEA0002669");

    service.delete("accounts", &key).await.unwrap();
}

#[tokio::test]
async fn test_create_requires_201() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "$key": "X" })))
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let error = service
        .create("accounts", &Record::new().with("AccountName", "Foo"))
        .await
        .unwrap_err();

    assert!(matches!(error, SDataError::Unknown { status: 200, .. }));
}

#[tokio::test]
async fn test_update_puts_to_entry_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path_regex(r#"^/sdata/contacts\((%22|")C1(%22|")\)$"#))
        .and(body_json(json!({ "$key": "C1", "LastName": "Abbott" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "$key": "C1",
            "LastName": "Abbott",
            "ModifyDate": "/Date(1700000000000)/"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let updated = service
        .update(
            "contacts",
            &Record::new().with("$key", "C1").with("LastName", "Abbott"),
        )
        .await
        .unwrap();

    assert!(updated.contains_key("ModifyDate"));
}

#[tokio::test]
async fn test_update_without_key_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let error = service
        .update("contacts", &Record::new().with("LastName", "Abbott"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        SDataError::MissingKey {
            resource_kind: "contacts".to_string()
        }
    );
}

#[tokio::test]
async fn test_upsert_routes_on_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "$key": "K1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "$key": "K2" })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);

    let updated = service
        .upsert("accounts", &Record::new().with("$key", "K1"))
        .await
        .unwrap();
    assert_eq!(updated.key().as_deref(), Some("K1"));

    // An empty key is not a key
    let created = service
        .upsert("accounts", &Record::new().with("$key", ""))
        .await
        .unwrap();
    assert_eq!(created.key().as_deref(), Some("K2"));

    service
        .upsert("accounts", &Record::new().with("AccountName", "New"))
        .await
        .unwrap();
}

// ============================================================================
// Business rules
// ============================================================================

#[tokio::test]
async fn test_call_business_rule_unwraps_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sdata/opportunities/$service/CloseOpportunity"))
        .and(query_param("format", "json"))
        .and(body_json(json!({
            "$name": "CloseOpportunity",
            "request": {
                "entity": { "$key": "O1" },
                "reason": "Won"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "$name": "CloseOpportunity",
            "response": { "Result": true }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut parameters = Map::new();
    parameters.insert("reason".to_string(), json!("Won"));

    let service = create_service(&mock_server);
    let result = service
        .call_business_rule("opportunities", "CloseOpportunity", "O1", Some(&parameters))
        .await
        .unwrap();

    assert_eq!(result, json!({ "Result": true }));
}

#[tokio::test]
async fn test_call_business_rule_without_response_field_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let result = service
        .call_business_rule("opportunities", "Recalculate", "O1", None)
        .await
        .unwrap();

    assert_eq!(result, json!({ "status": "ok" }));
}

// ============================================================================
// Error translation
// ============================================================================

#[tokio::test]
async fn test_401_is_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let error = service
        .read("accounts", "", &QueryOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(error, SDataError::Authentication { .. }));
    assert_eq!(error.to_string(), "Authentication failed");
    assert_eq!(error.status_code(), Some(401));
}

#[tokio::test]
async fn test_error_payload_is_protocol_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([
            {
                "severity": "Error",
                "sdataCode": "BadWhereSyntax",
                "message": "The where clause could not be parsed"
            },
            { "severity": "Warning", "message": "Second diagnosis" }
        ])))
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let error = service
        .read("accounts", "AccountName lik 'A%'", &QueryOptions::new())
        .await
        .unwrap_err();

    let SDataError::Protocol(protocol) = &error else {
        panic!("expected a protocol error, got {error:?}");
    };
    assert_eq!(protocol.status, 400);
    assert_eq!(protocol.severity.as_deref(), Some("Error"));
    assert_eq!(protocol.diagnoses.len(), 2);
    assert_eq!(
        error.to_string(),
        "SData Error: The where clause could not be parsed (BadWhereSyntax)"
    );
}

#[tokio::test]
async fn test_generic_server_error_gets_hint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!([{
            "message": format!("{GENERIC_SERVER_ERROR_PREFIX}. Please contact support."),
            "sdataCode": "ApplicationError"
        }])))
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let error = service.delete("accounts", "A1").await.unwrap_err();

    let SDataError::Protocol(protocol) = error else {
        panic!("expected a protocol error");
    };
    assert!(protocol.message.starts_with(GENERIC_SERVER_ERROR_PREFIX));
    assert!(protocol.message.ends_with(GENERIC_SERVER_ERROR_HINT));
}

#[tokio::test]
async fn test_unclassified_failure_is_unknown_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>Not Found</html>"))
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let error = service
        .read("nosuchthing", "", &QueryOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(error, SDataError::Unknown { status: 404, .. }));
    assert_eq!(error.to_string(), "Unknown SData error");
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let service = SDataService::new("http://127.0.0.1:1/sdata/", None, None).unwrap();
    let error = service
        .read("accounts", "", &QueryOptions::new())
        .await
        .unwrap_err();

    let SDataError::Connection { url, message } = &error else {
        panic!("expected a connection error, got {error:?}");
    };
    assert!(url.starts_with("http://127.0.0.1:1/sdata/accounts"));
    assert!(message.contains("127.0.0.1:1"));
    assert_eq!(error.status_code(), None);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_new_validates_inputs() {
    assert!(matches!(
        SDataService::new("not a url", None, None),
        Err(ConfigError::InvalidBaseUri { .. })
    ));
    assert!(SDataService::new("http://host/sdata/", Some("admin"), None).is_ok());
}

#[tokio::test]
async fn test_empty_username_sends_unauthenticated_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "$resources": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service =
        SDataService::new(&format!("{}/sdata", mock_server.uri()), Some(""), Some("pw")).unwrap();
    let page = service.read("accounts", "", &QueryOptions::new()).await.unwrap();

    assert!(page.resources.is_empty());
}

#[tokio::test]
async fn test_reconfiguration_applies_to_later_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Basic YWRtaW46"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "$resources": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Basic bGVlOnNlY3JldA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "$resources": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Anything else, including a request without credentials
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let clone = service.clone();
    let options = QueryOptions::new();

    service.read("accounts", "", &options).await.unwrap();

    service.set_authentication_parameters("lee", "secret").unwrap();
    clone.read("accounts", "", &options).await.unwrap();

    service.clear_authentication();
    let error = clone.read("accounts", "", &options).await.unwrap_err();
    assert!(matches!(error, SDataError::Authentication { .. }));

    assert!(matches!(
        service.set_authentication_parameters("", "secret"),
        Err(ConfigError::EmptyUsername)
    ));
}

#[tokio::test]
async fn test_with_completion_reports_outcome() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "$key": "N1" })))
        .mount(&mock_server)
        .await;

    let service = create_service(&mock_server);
    let record = Record::new().with("AccountName", "New");
    let seen = Cell::new(None);

    let created = with_completion(service.create("accounts", &record), |result| {
        seen.set(Some(result.map(Record::has_key).unwrap_or(false)));
    })
    .await
    .unwrap();

    assert_eq!(seen.get(), Some(true));
    assert_eq!(created.key().as_deref(), Some("N1"));
}
