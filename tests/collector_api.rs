//! Collector wire-contract tests against a local mock server.

use mockito::Server;

use inhash_crawler::collector::{CollectorClient, CollectorError};
use inhash_crawler::{Course, CrawlSnapshot, Item, ItemKind};

fn snapshot() -> CrawlSnapshot {
    CrawlSnapshot {
        client_version: "0.1.0".to_string(),
        client_platform: "rust".to_string(),
        crawled_at: "2025-09-20T12:00:00Z".to_string(),
        courses: vec![Course {
            id: "64609".to_string(),
            name: "OOP[XX-1]".to_string(),
            main_link: "https://learn.inha.ac.kr/course/view.php?id=64609".to_string(),
        }],
        items: vec![Item {
            kind: ItemKind::Assignment,
            course_name: "OOP[XX-1]".to_string(),
            title: "HW1".to_string(),
            url: Some("https://learn.inha.ac.kr/mod/assign/view.php?id=11".to_string()),
            due: Some("2025-09-25 00:00:00".to_string()),
            remaining_seconds: None,
        }],
    }
}

#[tokio::test]
async fn submit_sends_bearer_auth_and_wire_shape() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/crawl/submit/acct-1")
        .match_header("authorization", "Bearer tok-123")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "clientPlatform": "rust",
            "courses": [{
                "name": "OOP[XX-1]",
                "mainLink": "https://learn.inha.ac.kr/course/view.php?id=64609"
            }],
            "items": [{
                "type": "assignment",
                "courseName": "OOP[XX-1]",
                "title": "HW1",
                "due": "2025-09-25 00:00:00"
            }]
        })))
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let client = CollectorClient::new(server.url(), "tok-123");
    client.submit("acct-1", &snapshot()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn submit_surfaces_the_server_error_envelope() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/crawl/submit/acct-1")
        .with_status(500)
        .with_body(r#"{"success":false,"error":"db down"}"#)
        .create_async()
        .await;

    let client = CollectorClient::new(server.url(), "tok");
    let err = client.submit("acct-1", &snapshot()).await.unwrap_err();
    assert!(matches!(err, CollectorError::ServerRejected(msg) if msg == "db down"));
}

#[tokio::test]
async fn submit_falls_back_to_status_for_opaque_bodies() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/crawl/submit/acct-1")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let client = CollectorClient::new(server.url(), "tok");
    let err = client.submit("acct-1", &snapshot()).await.unwrap_err();
    assert!(matches!(err, CollectorError::ServerError(502)));
}

#[tokio::test]
async fn fetch_deadlines_accepts_both_due_at_shapes() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/deadlines/acct-1")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "assignments": [
                    { "id": "a1", "courseName": "OOP", "title": "HW1",
                      "url": "https://learn.inha.ac.kr/mod/assign/view.php?id=11",
                      "dueAt": "2025-09-25T00:00:00+09:00", "completed": false },
                    { "id": "a2", "courseName": "OOP", "title": "HW2",
                      "dueAt": 1758726000000, "completed": true }
                ],
                "lectures": [
                    { "id": "l1", "courseName": "생명과학", "title": "4주차 1교시" }
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = CollectorClient::new(server.url(), "tok");
    let sheet = client.fetch_deadlines("acct-1").await.unwrap();
    assert_eq!(sheet.assignments.len(), 2);
    assert_eq!(
        sheet.assignments[0].due_at.as_deref(),
        Some("2025-09-25T00:00:00+09:00")
    );
    assert_eq!(sheet.assignments[1].due_at.as_deref(), Some("2025-09-24T15:00:00Z"));
    assert!(sheet.assignments[1].completed);
    assert_eq!(sheet.lectures.len(), 1);
    assert_eq!(sheet.lectures[0].due_at, None);
}

#[tokio::test]
async fn fetch_deadlines_propagates_rejections() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/deadlines/acct-1")
        .with_status(404)
        .with_body(r#"{"success":false,"error":"unknown account"}"#)
        .create_async()
        .await;

    let client = CollectorClient::new(server.url(), "tok");
    let err = client.fetch_deadlines("acct-1").await.unwrap_err();
    assert!(matches!(err, CollectorError::ServerRejected(msg) if msg == "unknown account"));
}
