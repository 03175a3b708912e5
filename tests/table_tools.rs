//! Integration tests for the Table API tools.
//!
//! Uses wiremock to stand in for the ServiceNow instance.

use serde_json::json;
use servicenow_mcp::tools::create_record::{CreateRecordParams, create_record};
use servicenow_mcp::tools::get_single_record::{GetSingleRecordParams, get_single_record};
use servicenow_mcp::tools::query_records::{QueryRecordsParams, query_records};
use servicenow_mcp::tools::update_record::{UpdateRecordParams, update_record};
use servicenow_mcp::{ErrorType, TableClient};
use std::time::Duration;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SYS_ID: &str = "46d44a5fa9fe198101f2f2b1d0b3d6a1";

fn client_for(server: &MockServer) -> TableClient {
    TableClient::new(&server.uri(), "admin", "secret").unwrap()
}

fn query(table: &str, limit: Option<i64>) -> QueryRecordsParams {
    QueryRecordsParams {
        table_name: table.to_string(),
        query: String::new(),
        limit,
        fields: String::new(),
    }
}

async fn refuse_all_calls(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

// =============================================================================
// QUERY
// =============================================================================

#[tokio::test]
async fn test_query_limit_is_capped_at_100() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(query_param("sysparm_limit", "100"))
        .and(query_param("sysparm_display_value", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    for limit in [100, 5000] {
        let outcome = query_records(&client, &query("incident", Some(limit))).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.count(), Some(0));
    }
}

#[tokio::test]
async fn test_query_passes_filter_and_fields_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/change_request"))
        .and(query_param("sysparm_query", "active=true^priority=1"))
        .and(query_param("sysparm_fields", "number,short_description"))
        .and(query_param("sysparm_limit", "10"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                {"number": "CHG0030001", "short_description": "Patch"},
                {"number": "CHG0030002", "short_description": "Reboot"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = QueryRecordsParams {
        table_name: "change_request".into(),
        query: "active=true^priority=1".into(),
        limit: None,
        fields: "number,short_description".into(),
    };
    let outcome = query_records(&client_for(&server), &params).await;
    assert_eq!(outcome.count(), Some(2));
    assert_eq!(outcome.data().unwrap()[1]["number"], "CHG0030002");
}

#[tokio::test]
async fn test_query_single_object_becomes_one_element_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(query_param("sysparm_limit", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": {"sys_id": SYS_ID, "number": "INC0010001"}})),
        )
        .mount(&server)
        .await;

    let outcome = query_records(&client_for(&server), &query("incident", Some(5))).await;
    assert_eq!(outcome.count(), Some(1));
    assert_eq!(
        outcome.data().unwrap(),
        &json!([{"sys_id": SYS_ID, "number": "INC0010001"}])
    );
}

#[tokio::test]
async fn test_query_unknown_table_reports_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/not_a_table"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Invalid table not_a_table"},
            "status": "failure"
        })))
        .mount(&server)
        .await;

    let outcome = query_records(&client_for(&server), &query("not_a_table", None)).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::HttpError));
    assert_eq!(outcome.status_code(), Some(400));
    assert!(outcome.error().unwrap().contains("Invalid table not_a_table"));

    let wire: serde_json::Value = serde_json::from_str(&outcome.to_json_pretty()).unwrap();
    assert_eq!(wire["success"], false);
    assert_eq!(wire["error_type"], "http_error");
    assert_eq!(wire["status_code"], 400);
}

#[tokio::test]
async fn test_hibernating_instance_is_unexpected_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Instance Hibernating page</title></head></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let outcome = query_records(&client_for(&server), &query("incident", None)).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::UnexpectedContent));
    let message = outcome.error().unwrap();
    assert!(message.contains("text/html"));
    assert!(message.contains("Wake it up via a browser first"));
}

#[tokio::test]
async fn test_empty_body_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let outcome = query_records(&client_for(&server), &query("incident", None)).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::EmptyResponse));
}

#[tokio::test]
async fn test_garbled_json_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"result\": [", "application/json"),
        )
        .mount(&server)
        .await;

    let outcome = query_records(&client_for(&server), &query("incident", None)).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::JsonError));
    assert!(outcome.error().unwrap().contains("Body preview: {\"result\": ["));
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    // Nothing listens on port 1
    let client = TableClient::new("http://127.0.0.1:1", "admin", "secret").unwrap();
    let outcome = query_records(&client, &query("incident", None)).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::NetworkError));
    assert_eq!(outcome.status_code(), None);
}

#[tokio::test]
async fn test_redirect_is_reported_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/login_redirect.do"),
        )
        .mount(&server)
        .await;
    Mock::given(path("/login_redirect.do"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": [{"x": 1}]})))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = query_records(&client_for(&server), &query("incident", None)).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::HttpError));
    assert_eq!(outcome.status_code(), Some(302));
}

#[tokio::test]
async fn test_slow_instance_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client =
        TableClient::with_timeout(&server.uri(), "admin", "secret", Duration::from_millis(200))
            .unwrap();
    let outcome = query_records(&client, &query("incident", None)).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::Timeout));
    assert_eq!(outcome.status_code(), None);
    assert!(outcome.error().unwrap().starts_with("Request timeout: "));
}

#[tokio::test]
async fn test_unbuildable_request_is_unexpected_error() {
    // Not an absolute URL, so the request never leaves the builder
    let client = TableClient::new("not a url", "admin", "secret").unwrap();
    let outcome = query_records(&client, &query("incident", None)).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::UnexpectedError));
    assert_eq!(outcome.status_code(), None);
    assert!(outcome.error().unwrap().starts_with("Unexpected error: "));
}

// =============================================================================
// SINGLE RECORD
// =============================================================================

#[tokio::test]
async fn test_single_record_builds_equality_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/change_request"))
        .and(query_param("sysparm_query", "number=CHG0030001"))
        .and(query_param("sysparm_limit", "1"))
        .and(query_param("sysparm_display_value", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"number": "CHG0030001", "state": "New"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = GetSingleRecordParams {
        table_name: "change_request".into(),
        record_number: "CHG0030001".into(),
        query_field: "number".into(),
        fields: String::new(),
    };
    let outcome = get_single_record(&client_for(&server), &params).await;
    assert_eq!(outcome.count(), Some(1));
    assert_eq!(outcome.data().unwrap()[0]["state"], "New");
}

#[tokio::test]
async fn test_single_record_zero_matches_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
        .mount(&server)
        .await;

    let params = GetSingleRecordParams {
        table_name: "incident".into(),
        record_number: "INC9999999".into(),
        query_field: "number".into(),
        fields: String::new(),
    };
    let outcome = get_single_record(&client_for(&server), &params).await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.error_type(), Some(ErrorType::NotFound));
    assert_eq!(
        outcome.error(),
        Some("Record INC9999999 not found in incident")
    );
}

#[tokio::test]
async fn test_single_record_transport_failure_is_not_masked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let params = GetSingleRecordParams {
        table_name: "incident".into(),
        record_number: "INC0010001".into(),
        query_field: "number".into(),
        fields: String::new(),
    };
    let outcome = get_single_record(&client_for(&server), &params).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::HttpError));
    assert_eq!(outcome.status_code(), Some(503));
}

// =============================================================================
// CREATE / UPDATE
// =============================================================================

#[tokio::test]
async fn test_create_with_malformed_payload_makes_no_call() {
    let server = MockServer::start().await;
    refuse_all_calls(&server).await;

    let params = CreateRecordParams {
        table_name: "incident".into(),
        payload_json: "{short_description: test}".into(),
    };
    let outcome = create_record(&client_for(&server), &params).await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.error_type(), Some(ErrorType::InvalidPayloadJson));
}

#[tokio::test]
async fn test_update_with_bad_sys_id_makes_no_call() {
    let server = MockServer::start().await;
    refuse_all_calls(&server).await;
    let client = client_for(&server);

    for sys_id in ["INC0010001", "", "46D44A5FA9FE198101F2F2B1D0B3D6A1", "../../sys_user"] {
        let params = UpdateRecordParams {
            table_name: "incident".into(),
            sys_id: sys_id.into(),
            payload_json: r#"{"state": "2"}"#.into(),
        };
        let outcome = update_record(&client, &params).await;
        assert_eq!(outcome.error_type(), Some(ErrorType::InvalidSysIdFormat));
    }
}

#[tokio::test]
async fn test_update_with_malformed_payload_makes_no_call() {
    let server = MockServer::start().await;
    refuse_all_calls(&server).await;

    let params = UpdateRecordParams {
        table_name: "incident".into(),
        sys_id: SYS_ID.into(),
        payload_json: "not json".into(),
    };
    let outcome = update_record(&client_for(&server), &params).await;
    assert_eq!(outcome.error_type(), Some(ErrorType::InvalidPayloadJson));
}

#[tokio::test]
async fn test_update_patches_record_with_local_time_tagging() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/api/now/table/incident/{}", SYS_ID)))
        .and(query_param("sysparm_input_display_value", "true"))
        .and(body_json(json!({"work_start": "2025-01-10 09:00:00"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"sys_id": SYS_ID, "work_start": "2025-01-10 09:00:00"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = UpdateRecordParams {
        table_name: "incident".into(),
        sys_id: SYS_ID.into(),
        payload_json: r#"{"work_start": "2025-01-10 09:00:00"}"#.into(),
    };
    let outcome = update_record(&client_for(&server), &params).await;
    assert!(outcome.is_success());
    assert_eq!(outcome.data().unwrap()["sys_id"], SYS_ID);
    assert_eq!(outcome.count(), None);
}

#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/now/table/incident"))
        .and(query_param("sysparm_input_display_value", "true"))
        .and(body_json(json!({"short_description": "test"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "result": {"sys_id": SYS_ID, "number": "INC0010042", "short_description": "test"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(query_param("sysparm_query", format!("sys_id={}", SYS_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{"sys_id": SYS_ID, "number": "INC0010042", "short_description": "test"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = create_record(
        &client,
        &CreateRecordParams {
            table_name: "incident".into(),
            payload_json: r#"{"short_description":"test"}"#.into(),
        },
    )
    .await;
    assert!(created.is_success());
    let sys_id = created.data().unwrap()["sys_id"].as_str().unwrap().to_string();

    let fetched = get_single_record(
        &client,
        &GetSingleRecordParams {
            table_name: "incident".into(),
            record_number: sys_id,
            query_field: "sys_id".into(),
            fields: String::new(),
        },
    )
    .await;
    assert!(fetched.is_success());
    assert_eq!(fetched.data().unwrap()[0]["short_description"], "test");
}
