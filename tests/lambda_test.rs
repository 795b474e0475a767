//! Lambda handler contracts: fixed ingest response and proxy-shaped search
//! responses for both query event shapes.

mod common;

use common::{FixtureBuilder, notification};
use lambda_runtime::{Context, LambdaEvent};
use photo_search::{
    handlers::lambda_handlers::{index_photos, search_photos},
    models::events::{IngestResponse, SearchEvent},
};
use serde_json::{Value, json};

fn event<T>(payload: T) -> LambdaEvent<T> {
    LambdaEvent::new(payload, Context::default())
}

fn search_event(value: Value) -> LambdaEvent<SearchEvent> {
    event(serde_json::from_value(value).unwrap())
}

#[tokio::test]
async fn ingest_always_reports_completion() {
    let mut builder = FixtureBuilder::new();
    builder.credentials_fail = true;
    let fixture = builder.build();

    let response = index_photos(
        &fixture.state.ingest,
        event(notification(&[("b1", "a.jpg"), ("b1", "b.jpg")])),
    )
    .await
    .unwrap();

    assert_eq!(response, IngestResponse::complete());
    assert!(fixture.index.documents().is_empty());
}

#[tokio::test]
async fn search_reads_query_string_parameters() {
    let fixture = FixtureBuilder::new()
        .detected("dog.jpg", &["Dog"])
        .keywords("dogs", "dog")
        .build();
    fixture
        .state
        .ingest
        .process_batch(&notification(&[("b1", "dog.jpg")]))
        .await;

    let response = search_photos(
        &fixture.state.search,
        search_event(json!({
            "resource": "/search",
            "httpMethod": "GET",
            "queryStringParameters": { "q": "dogs" }
        })),
    )
    .await
    .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(
        body,
        json!({ "results": [{ "objectKey": "dog.jpg", "bucket": "b1", "labels": ["Dog"] }] })
    );
}

#[tokio::test]
async fn search_reads_flat_field() {
    let fixture = FixtureBuilder::new()
        .detected("cat.jpg", &["Cat"])
        .keywords("cats", "cat")
        .build();
    fixture
        .state
        .ingest
        .process_batch(&notification(&[("b1", "cat.jpg")]))
        .await;

    let response = search_photos(&fixture.state.search, search_event(json!({ "q": "cats" })))
        .await
        .unwrap();

    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["results"][0]["objectKey"], "cat.jpg");
}

#[tokio::test]
async fn search_without_query_is_empty_success() {
    let fixture = FixtureBuilder::new().build();

    let response = search_photos(
        &fixture.state.search,
        search_event(json!({ "queryStringParameters": null })),
    )
    .await
    .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"results":[]}"#);
    assert_eq!(response.headers.len(), 4);
}

#[tokio::test]
async fn search_without_interpretation_is_empty_success() {
    let fixture = FixtureBuilder::new().build();

    let response = search_photos(&fixture.state.search, search_event(json!({ "q": "hello" })))
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"results":[]}"#);
}

#[tokio::test]
async fn search_with_non_string_query_is_empty_success() {
    let fixture = FixtureBuilder::new()
        .detected("five.jpg", &["five"])
        .keywords("5", "five")
        .build();
    fixture
        .state
        .ingest
        .process_batch(&notification(&[("b1", "five.jpg")]))
        .await;

    for payload in [
        json!({ "q": 5 }),
        json!({ "queryStringParameters": { "q": null } }),
        json!({ "queryStringParameters": { "page": "1" }, "q": "5" }),
    ] {
        let response = search_photos(&fixture.state.search, search_event(payload))
            .await
            .unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"results":[]}"#);
    }
}
