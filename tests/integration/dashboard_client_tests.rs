/*!
 * Tests for the dashboard client against a local stub server
 */

use anyhow::Result;

use crate::common::{StubResponse, StubServer};
use greyparrot::errors::AppError;
use greyparrot::reconcile::{DashboardClient, SheetService};

/// Test the reconciliation request shape and response decoding
#[tokio::test]
async fn test_reconcile_withSuccessResponse_shouldSendPutWithBearerToken() -> Result<()> {
    let server = StubServer::start(vec![StubResponse::json(
        200,
        r#"{"success":true,"entries":[{"key":"hello_world","translations":{"en":"Hello world","fr":"Bonjour le monde"}}],"errors":[]}"#,
    )])
    .await?;
    let client = DashboardClient::new(&server.base_url, "secret-token");

    let result = client
        .reconcile("42", &["Hello world".to_string()], "en")
        .await?;

    assert!(result.success);
    assert_eq!(result.entries[0].key, "hello_world");
    assert_eq!(result.entries[0].translations["fr"], "Bonjour le monde");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].request_line.starts_with("PUT /api/sheets/42/entry "));
    assert_eq!(requests[0].header("authorization"), Some("Bearer secret-token"));
    let body: serde_json::Value = serde_json::from_str(&requests[0].body)?;
    assert_eq!(body, serde_json::json!({"text": ["Hello world"], "currentLanguage": "en"}));
    Ok(())
}

/// Test that a failed result is surfaced as a reconciliation error
#[tokio::test]
async fn test_reconcile_withSuccessFalse_shouldBecomeReconciliationError() -> Result<()> {
    let server = StubServer::start(vec![StubResponse::json(
        200,
        r#"{"success":false,"entries":[],"errors":["AI response contained no entries"]}"#,
    )])
    .await?;
    let client = DashboardClient::new(&server.base_url, "t");

    let result = client.reconcile("1", &["x".to_string()], "en").await?;

    match result.into_entries() {
        Err(AppError::Reconciliation(message)) => {
            assert!(message.contains("no entries"))
        }
        other => panic!("unexpected: {:?}", other),
    }
    Ok(())
}

/// Test that the server's message is carried by remote errors
#[tokio::test]
async fn test_reconcile_withForbidden_shouldSurfaceRemoteMessage() -> Result<()> {
    let server = StubServer::start(vec![StubResponse::json(
        403,
        r#"{"statusCode":403,"message":"No edit permission"}"#,
    )])
    .await?;
    let client = DashboardClient::new(&server.base_url, "t");

    let result = client.reconcile("1", &["x".to_string()], "en").await;

    match result {
        Err(AppError::Remote { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "No edit permission");
        }
        other => panic!("unexpected: {:?}", other),
    }
    Ok(())
}

/// Test the generic message when the error body has none
#[tokio::test]
async fn test_messages_withBareServerError_shouldUseGenericMessage() -> Result<()> {
    let server = StubServer::start(vec![StubResponse::json(500, "oops")]).await?;
    let client = DashboardClient::new(&server.base_url, "t");

    match client.messages("1").await {
        Err(AppError::Remote { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("500"));
        }
        other => panic!("unexpected: {:?}", other),
    }
    Ok(())
}

/// Test fetching messages
#[tokio::test]
async fn test_messages_withSuccessResponse_shouldDecodeLocaleMaps() -> Result<()> {
    let server = StubServer::start(vec![StubResponse::json(
        200,
        r#"{"en":{"hello":"Hello"},"fr":{"hello":"Bonjour"}}"#,
    )])
    .await?;
    let client = DashboardClient::new(&server.base_url, "abc");

    let messages = client.messages("7").await?;

    assert_eq!(messages["fr"]["hello"], "Bonjour");
    let requests = server.requests();
    assert!(requests[0].request_line.starts_with("GET /api/sheets/7/messages "));
    assert_eq!(requests[0].header("Authorization"), Some("Bearer abc"));
    Ok(())
}
