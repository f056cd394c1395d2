//! End-to-end scenarios against a mock WSAPI server.
//!
//! These tests exercise the full stack: request building, transport,
//! security tokens, pagination fan-out, and result assembly.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rally_rest_api::auth::Credentials;
use rally_rest_api::client::{ClientConfig, TraceVerbosity, WsapiVersion};
use rally_rest_api::types::Value;
use rally_rest_api::wsapi::{RallyClient, Request};

fn quiet_client(server: &MockServer) -> RallyClient {
    RallyClient::with_config(
        server.uri(),
        Credentials::basic("user", "pass"),
        ClientConfig::builder()
            .with_trace(TraceVerbosity::Off)
            .build(),
    )
    .unwrap()
    .with_version(WsapiVersion::V2_0)
}

/// One page of `size` sequential objects starting at `start`, tagged with a
/// per-page warning so assembly order is observable.
fn page_body(total: u32, start: u32, size: u32) -> String {
    let results: Vec<String> = (start..start + size)
        .map(|oid| format!(r#"{{"ObjectID":{oid},"Name":"item-{oid}"}}"#))
        .collect();
    format!(
        r#"{{"QueryResult":{{"TotalResultCount":{total},"StartIndex":{start},"Results":[{}],"Errors":[],"Warnings":["page {start}"]}}}}"#,
        results.join(",")
    )
}

async fn mount_page(server: &MockServer, total: u32, start: u32, size: u32, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/slm/webservice/v2.0/defect"))
        .and(query_param("start", start.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_body(total, start, size))
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn object_ids(result: &rally_rest_api::wsapi::QueryResult) -> Vec<i64> {
    result
        .results
        .iter()
        .filter_map(|r| r.get_i64("ObjectID"))
        .collect()
}

#[tokio::test]
async fn paginated_query_fetches_every_page_and_concatenates() {
    let server = MockServer::start().await;

    // 450 results, pages of 200: three fetches, the last one partial.
    mount_page(&server, 450, 1, 200, Duration::ZERO).await;
    mount_page(&server, 450, 201, 200, Duration::ZERO).await;
    mount_page(&server, 450, 401, 50, Duration::ZERO).await;

    let client = quiet_client(&server);
    let mut request = Request::new("Defect");
    request.limit = 1000;

    let result = client.query(&request).await.unwrap();

    assert!(result.success());
    assert_eq!(result.total_result_count, 450);
    assert_eq!(result.results.len(), 450);
    assert_eq!(object_ids(&result), (1..=450).collect::<Vec<i64>>());
    // Page-count law is enforced by the expect(1) on each mounted page.
    server.verify().await;
}

#[tokio::test]
async fn results_are_ordered_by_start_regardless_of_completion_order() {
    let server = MockServer::start().await;

    // Five pages of ten. The artificial delays force completion order
    // 41, 21, 31, 11 for the sub-pages; assembly must not care.
    let total = 50;
    mount_page(&server, total, 1, 10, Duration::ZERO).await;
    mount_page(&server, total, 11, 10, Duration::from_millis(250)).await;
    mount_page(&server, total, 21, 10, Duration::from_millis(10)).await;
    mount_page(&server, total, 31, 10, Duration::from_millis(120)).await;
    mount_page(&server, total, 41, 10, Duration::ZERO).await;

    let client = quiet_client(&server);
    let mut request = Request::new("Defect");
    request.page_size = 10;
    request.limit = 1000;

    let result = client.query(&request).await.unwrap();

    assert_eq!(object_ids(&result), (1..=50).collect::<Vec<i64>>());

    // Errors/warnings concatenate first-page-first, then ascending start.
    assert_eq!(
        result.operation.warnings,
        vec!["page 1", "page 11", "page 21", "page 31", "page 41"]
    );
}

#[tokio::test]
async fn limit_caps_the_number_of_results() {
    let server = MockServer::start().await;

    let total = 100;
    mount_page(&server, total, 1, 10, Duration::ZERO).await;
    mount_page(&server, total, 11, 10, Duration::ZERO).await;
    mount_page(&server, total, 21, 10, Duration::ZERO).await;

    let client = quiet_client(&server);
    let mut request = Request::new("Defect");
    request.page_size = 10;
    request.limit = 30;

    let result = client.query(&request).await.unwrap();

    // min(limit, total) results, no fetch beyond the limit.
    assert_eq!(result.results.len(), 30);
    assert_eq!(object_ids(&result), (1..=30).collect::<Vec<i64>>());
    server.verify().await;
}

#[tokio::test]
async fn sub_page_failure_aborts_the_whole_query() {
    let server = MockServer::start().await;

    let total = 30;
    mount_page(&server, total, 1, 10, Duration::ZERO).await;
    // The in-flight sibling page may be cancelled, so no call-count
    // expectation on it.
    Mock::given(method("GET"))
        .and(path("/slm/webservice/v2.0/defect"))
        .and(query_param("start", "21"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_body(total, 21, 10))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slm/webservice/v2.0/defect"))
        .and(query_param("start", "11"))
        .respond_with(ResponseTemplate::new(500).set_body_string("splat"))
        .mount(&server)
        .await;

    let client = quiet_client(&server);
    let mut request = Request::new("Defect");
    request.page_size = 10;
    request.limit = 1000;

    let err = client.query(&request).await.unwrap_err();
    assert!(err.as_transport().is_some());
}

#[tokio::test]
async fn create_then_fetch_lifecycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slm/webservice/v2.0/security/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"OperationResult":{"Errors":[],"Warnings":[],"SecurityToken":"tok"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/slm/webservice/v2.0/defect/create"))
        .and(query_param("key", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"CreateResult":{"Errors":[],"Warnings":[],
                "Object":{"_ref":"https://host/slm/webservice/v2.0/defect/77","Name":"Crash on save"}}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slm/webservice/v2.0/defect/77"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"Defect":{"_ref":"https://host/slm/webservice/v2.0/defect/77",
                "Name":"Crash on save","Severity":"Major","Errors":[],"Warnings":[]}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = quiet_client(&server);

    let mut defect = rally_rest_api::types::Record::new();
    defect.set("Name", "Crash on save");
    defect.set("Tags", Value::Array(vec![Value::String("regression".into())]));

    let created = client.create("Defect", defect).await.unwrap();
    assert!(created.success());
    let reference = created.reference.expect("created object carries a _ref");

    let fetched = client.get_by_reference(&reference, &[]).await.unwrap();
    assert_eq!(fetched.total_result_count, 1);
    assert_eq!(
        fetched.first().unwrap().get_str("Severity"),
        Some("Major")
    );
}

#[tokio::test]
async fn service_outage_surfaces_as_service_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<!DOCTYPE html>\n<html><body><h1>Scheduled maintenance</h1></body></html>",
        ))
        .mount(&server)
        .await;

    let client = quiet_client(&server);
    let err = client.query(&Request::new("Defect")).await.unwrap_err();
    assert!(err.is_service_unavailable());
}
