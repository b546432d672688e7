//! Connection details integration tests.
//!
//! Exercises `POST /api/connection-details` over real HTTP using the
//! `TestIssuerServer` harness.

use common::jwt::{peek_claims, ACCESS_TOKEN_TTL};
use common::types::ConnectionDescriptor;
use issuer_test_utils::{
    test_livekit_vars, verify_issued_token, TestIssuerServer, TEST_API_KEY, TEST_LIVEKIT_URL,
};

fn is_suffix(s: &str) -> bool {
    s.len() == 7 && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

async fn post_connection(server: &TestIssuerServer) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}/api/connection-details", server.url()))
        .send()
        .await?)
}

/// A configured server returns four non-empty fields in the expected formats.
#[tokio::test]
async fn test_issue_connection_details() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let response = post_connection(&server).await?;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    let object = body.as_object().ok_or_else(|| anyhow::anyhow!("not an object"))?;
    assert_eq!(object.len(), 4);

    assert_eq!(body["serverUrl"], TEST_LIVEKIT_URL);

    let room_name = body["roomName"].as_str().unwrap_or_default();
    let room_suffix = room_name.strip_prefix("voice-room-").unwrap_or_default();
    assert!(is_suffix(room_suffix), "bad room name {room_name}");

    let participant_name = body["participantName"].as_str().unwrap_or_default();
    let participant_suffix = participant_name.strip_prefix("user-").unwrap_or_default();
    assert!(is_suffix(participant_suffix), "bad participant {participant_name}");

    assert!(!body["participantToken"].as_str().unwrap_or_default().is_empty());

    Ok(())
}

/// The token verifies with the API secret and grants exactly the issued room.
#[tokio::test]
async fn test_token_grants_issued_room() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let descriptor: ConnectionDescriptor = post_connection(&server).await?.json().await?;

    let claims = verify_issued_token(&descriptor.participant_token)?;

    assert_eq!(claims.iss, TEST_API_KEY);
    assert_eq!(claims.sub, descriptor.participant_name);
    assert_eq!(claims.video.room, descriptor.room_name);
    assert!(claims.video.room_join);
    assert!(claims.video.can_publish);
    assert!(claims.video.can_subscribe);
    assert!(claims.video.can_publish_data);
    assert_eq!(
        claims.exp - claims.nbf,
        i64::try_from(ACCESS_TOKEN_TTL.as_secs())?
    );

    Ok(())
}

/// Each call mints a new room and identity.
#[tokio::test]
async fn test_each_call_gets_fresh_room() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let first: ConnectionDescriptor = post_connection(&server).await?.json().await?;
    let second: ConnectionDescriptor = post_connection(&server).await?.json().await?;

    assert_ne!(first.room_name, second.room_name);
    assert_ne!(first.participant_name, second.participant_name);

    Ok(())
}

/// Missing LIVEKIT_API_KEY yields 500 with the fixed error body.
#[tokio::test]
async fn test_missing_api_key_returns_500() -> Result<(), anyhow::Error> {
    let mut vars = test_livekit_vars();
    vars.remove("LIVEKIT_API_KEY");
    let server = TestIssuerServer::spawn_with_vars(vars).await?;

    let response = post_connection(&server).await?;
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body,
        serde_json::json!({"error": "LiveKit credentials not configured"})
    );

    Ok(())
}

/// An empty value is treated the same as an unset one.
#[tokio::test]
async fn test_empty_secret_returns_500() -> Result<(), anyhow::Error> {
    let mut vars = test_livekit_vars();
    vars.insert("LIVEKIT_API_SECRET".to_string(), String::new());
    let server = TestIssuerServer::spawn_with_vars(vars).await?;

    let response = post_connection(&server).await?;

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "LiveKit credentials not configured");

    Ok(())
}

/// The request body is ignored, even when it is not JSON.
#[tokio::test]
async fn test_request_body_is_ignored() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/connection-details", server.url()))
        .header("content-type", "text/plain")
        .body("not json")
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let descriptor: ConnectionDescriptor = response.json().await?;
    let claims = peek_claims(&descriptor.participant_token)?;
    assert_eq!(claims.iss, TEST_API_KEY);

    Ok(())
}

#[tokio::test]
async fn test_get_is_not_allowed() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let response = reqwest::get(format!("{}/api/connection-details", server.url())).await?;

    assert_eq!(response.status(), 405);

    Ok(())
}
