mod helpers;

use helpers::fixtures::task_json;
use helpers::{api_path, mock_server, test_client};
use kmanager_api_client::{ApiClient, UNKNOWN_ERROR_MESSAGE};
use kmanager_core::models::TaskStatusResponse;
use kmanager_core::{ClientConfig, ClientError};

#[tokio::test]
async fn test_get_decodes_json() {
    let mut server = mock_server().await;
    let mock = server
        .mock("GET", api_path("/content/task/t-1").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(task_json("t-1", "processing").to_string())
        .create_async()
        .await;

    let client = test_client(&server.url());
    let status: TaskStatusResponse = client.get("/content/task/t-1", &[]).await.unwrap();

    assert_eq!(status.task_id, "t-1");
    assert!(!status.is_terminal());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_body_message_is_extracted() {
    let mut server = mock_server().await;
    server
        .mock("GET", api_path("/content/missing").as_str())
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Content not found"}"#)
        .create_async()
        .await;
    server
        .mock("POST", api_path("/content/submit").as_str())
        .with_status(422)
        .with_body(r#"{"detail": [{"loc": ["body", "url"], "msg": "field required"}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", api_path("/tutorials").as_str())
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let client = test_client(&server.url());

    let err = client
        .get::<serde_json::Value>("content/missing", &[])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(&err, ClientError::Http { message, .. } if message == "Content not found"));

    let err = client
        .post_json::<serde_json::Value, _>("content/submit", &serde_json::json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(matches!(&err, ClientError::Http { message, .. } if message == "field required"));

    let err = client
        .get::<serde_json::Value>("tutorials", &[])
        .await
        .unwrap_err();
    assert!(matches!(&err, ClientError::Http { status: 500, message } if message == UNKNOWN_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_no_content_decodes_as_unit() {
    let mut server = mock_server().await;
    server
        .mock("DELETE", api_path("/tutorials/tut-1").as_str())
        .with_status(204)
        .create_async()
        .await;
    server
        .mock("POST", api_path("/content/refresh").as_str())
        .with_status(204)
        .create_async()
        .await;

    let client = test_client(&server.url());
    client.delete("tutorials/tut-1").await.unwrap();

    let body: Option<serde_json::Value> = client
        .post_json("content/refresh", &serde_json::json!({}))
        .await
        .unwrap();
    assert_eq!(body, None);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut server = mock_server().await;
    server
        .mock("GET", api_path("/content/task/t-2").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"task_id": "t-2", "status": 42}"#)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let err = client
        .get::<TaskStatusResponse>("content/task/t-2", &[])
        .await
        .unwrap_err();

    assert!(matches!(&err, ClientError::Parse { endpoint, .. } if endpoint == "content/task/t-2"));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = ApiClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();
    let err = client
        .get::<serde_json::Value>("tutorials", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn test_query_parameters_are_appended() {
    let mut server = mock_server().await;
    let mock = server
        .mock("GET", api_path("/tutorials").as_str())
        .match_query(helpers::query(&[("offset", "50"), ("limit", "25")]))
        .with_status(200)
        .with_body(r#"{"total": 0, "items": []}"#)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let _: serde_json::Value = client
        .get(
            "tutorials",
            &[("offset", "50".to_string()), ("limit", "25".to_string())],
        )
        .await
        .unwrap();
    mock.assert_async().await;
}
