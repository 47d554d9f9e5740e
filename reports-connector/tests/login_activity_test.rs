// Integration tests for the login activity table against a mock Reports API

use chrono::{TimeZone, Utc};
use futures::StreamExt;
use mockito::{Matcher, Server, ServerGuard};
use query_host::{Operator, QualValue, Quals, QueryData, Row, Table};
use reports_connector::connectors::login_activity::api::ReportsClient;
use reports_connector::{ConnectorConfig, LoginActivityTable};
use serde_json::json;
use std::sync::Arc;

const LIST_PATH: &str = "/admin/reports/v1/activity/users/all/applications/login";

fn items(range: std::ops::Range<usize>) -> serde_json::Value {
    let items: Vec<_> = range
        .map(|n| {
            json!({
                "id": {
                    "time": format!("2024-06-01T00:{:02}:00.000Z", n % 60),
                    "uniqueQualifier": n.to_string(),
                    "applicationName": "login"
                },
                "actor": {"email": format!("user{}@example.com", n), "callerType": "USER"},
                "ipAddress": "192.0.2.1",
                "events": [{"type": "login", "name": "login_success"}]
            })
        })
        .collect();
    json!(items)
}

fn create_table(server: &ServerGuard) -> LoginActivityTable {
    let config = ConnectorConfig {
        base_url: server.url(),
        ..Default::default()
    };
    let client = ReportsClient::from_config("test_token".to_string(), &config).unwrap();
    LoginActivityTable::new(Arc::new(client), config)
}

fn one_day_query(extra: Quals, limit: Option<u64>) -> QueryData {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
    let quals = extra
        .with("time", Operator::Ge, QualValue::Timestamp(start))
        .with("time", Operator::Le, QualValue::Timestamp(end));
    QueryData::new(quals, limit)
}

#[tokio::test]
async fn test_list_pages_until_token_runs_out() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", LIST_PATH)
        .match_header("authorization", "Bearer test_token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("startTime".into(), "2024-06-01T00:00:00.000Z".into()),
            Matcher::UrlEncoded("endTime".into(), "2024-06-02T00:00:00.000Z".into()),
            Matcher::UrlEncoded("maxResults".into(), "500".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"items": items(0..3), "nextPageToken": "p2"}).to_string())
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", LIST_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("pageToken".into(), "p2".into()),
            Matcher::UrlEncoded("maxResults".into(), "497".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"items": items(3..5)}).to_string())
        .expect(1)
        .create_async()
        .await;

    let table = create_table(&server);
    let rows: Vec<Row> = table
        .list(&one_day_query(Quals::new(), None))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(rows.len(), 5);
    let qualifiers: Vec<_> = rows.iter().map(|r| r["unique_qualifier"].clone()).collect();
    assert_eq!(qualifiers, vec!["0", "1", "2", "3", "4"]);
    assert_eq!(rows[0]["title"], "2024-06-01T00:00:00.000Z - user0@example.com");
    assert_eq!(rows[4]["tags"], json!(["login_success"]));

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_list_sends_equality_filters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", LIST_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filters".into(), r#"actor.email=="x@y.com""#.into()),
            Matcher::UrlEncoded("maxResults".into(), "5".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"items": items(0..1)}).to_string())
        .expect(1)
        .create_async()
        .await;

    let table = create_table(&server);
    let extra = Quals::new().with("actor_email", Operator::Eq, QualValue::String("x@y.com".into()));
    let rows: Vec<_> = table
        .list(&one_day_query(extra, Some(5)))
        .unwrap()
        .collect()
        .await;

    assert_eq!(rows.len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_on_second_page_keeps_first_page_rows() {
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", LIST_PATH)
        .match_query(Matcher::UrlEncoded("maxResults".into(), "500".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"items": items(0..50), "nextPageToken": "p2"}).to_string())
        .create_async()
        .await;
    let _second = server
        .mock("GET", LIST_PATH)
        .match_query(Matcher::UrlEncoded("pageToken".into(), "p2".into()))
        .with_status(503)
        .create_async()
        .await;

    let table = create_table(&server);
    let results: Vec<_> = table
        .list(&one_day_query(Quals::new(), None))
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 51);
    assert!(results[..50].iter().all(Result::is_ok));
    let err = results[50].as_ref().unwrap_err();
    assert!(err.to_string().contains("Reports API error: 503"));
}

#[tokio::test]
async fn test_inverted_window_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", LIST_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let table = create_table(&server);
    let quals = Quals::new()
        .with(
            "time",
            Operator::Gt,
            QualValue::Timestamp(Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()),
        )
        .with(
            "time",
            Operator::Lt,
            QualValue::Timestamp(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
        );
    let rows: Vec<_> = table
        .list(&QueryData::new(quals, None))
        .unwrap()
        .collect()
        .await;

    assert!(rows.is_empty());
    mock.assert_async().await;
}
