//! Todoist sink against a mock HTTP server.

use lifeos_core::error::SinkError;
use lifeos_core::sink::{NewReminder, ReminderPriority, TaskSink, TodoistSink};
use mockito::Matcher;
use serde_json::json;

fn reminder() -> NewReminder {
    NewReminder {
        title: "Review: Borrow Checker".into(),
        description: "Shared xor mutable...\n\nPath: `borrow_checker.md`".into(),
        tags: vec!["review".into()],
        priority: ReminderPriority::High,
    }
}

#[test]
fn create_posts_task_and_returns_id() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/tasks")
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::PartialJson(json!({
            "content": "Review: Borrow Checker",
            "labels": ["review"],
            "priority": 3,
            "due_string": "today",
            "project_id": "2203306141",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "8123", "content": "Review: Borrow Checker"}"#)
        .create();

    let sink = TodoistSink::with_token(&server.url(), "secret")
        .unwrap()
        .with_project(Some("2203306141".into()));
    let id = sink.create(&reminder()).unwrap();

    assert_eq!(id, "8123");
    mock.assert();
}

#[test]
fn list_active_collects_ids() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/tasks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": "1"}, {"id": 2}, {"content": "no id"}]"#)
        .create();

    let sink = TodoistSink::with_token(&server.url(), "secret").unwrap();
    let ids = sink.list_active().unwrap();

    assert_eq!(ids.len(), 2);
    assert!(ids.contains("1"));
    assert!(ids.contains("2"));
    mock.assert();
}

#[test]
fn list_active_follows_the_cursor_through_every_page() {
    let mut server = mockito::Server::new();
    let first = server
        .mock("GET", "/tasks")
        .match_query(Matcher::Regex("^$".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results": [{"id": "1"}, {"id": "2"}], "next_cursor": "page-2"}"#)
        .create();
    let second = server
        .mock("GET", "/tasks")
        .match_query(Matcher::UrlEncoded("cursor".into(), "page-2".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results": [{"id": "3"}], "next_cursor": null}"#)
        .create();

    let sink = TodoistSink::with_token(&server.url(), "secret").unwrap();
    let ids = sink.list_active().unwrap();

    assert_eq!(ids.len(), 3);
    assert!(ids.contains("3"));
    first.assert();
    second.assert();
}

#[test]
fn failing_later_page_fails_the_listing() {
    let mut server = mockito::Server::new();
    let _first = server
        .mock("GET", "/tasks")
        .match_query(Matcher::Regex("^$".into()))
        .with_status(200)
        .with_body(r#"{"results": [{"id": "1"}], "next_cursor": "page-2"}"#)
        .create();
    let _second = server
        .mock("GET", "/tasks")
        .match_query(Matcher::UrlEncoded("cursor".into(), "page-2".into()))
        .with_status(503)
        .with_body("busy")
        .create();

    let sink = TodoistSink::with_token(&server.url(), "secret").unwrap();
    assert!(matches!(
        sink.list_active(),
        Err(SinkError::Api { status: 503, .. })
    ));
}

#[test]
fn delete_hits_the_task_endpoint() {
    let mut server = mockito::Server::new();
    let mock = server.mock("DELETE", "/tasks/77").with_status(204).create();

    let sink = TodoistSink::with_token(&server.url(), "secret").unwrap();
    sink.delete("77").unwrap();

    mock.assert();
}

#[test]
fn api_errors_carry_status_and_body() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/tasks")
        .with_status(401)
        .with_body("Forbidden")
        .create();

    let sink = TodoistSink::with_token(&server.url(), "bad").unwrap();
    match sink.list_active() {
        Err(SinkError::Api { status, body, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "Forbidden");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[test]
fn malformed_listing_is_a_decode_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/tasks")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"tasks": []}"#)
        .create();

    let sink = TodoistSink::with_token(&server.url(), "secret").unwrap();
    assert!(matches!(sink.list_active(), Err(SinkError::Decode { .. })));
}

#[test]
fn verify_checks_projects_endpoint() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/projects")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_body("[]")
        .create();

    let sink = TodoistSink::with_token(&server.url(), "secret").unwrap();
    sink.verify().unwrap();
    mock.assert();
}
