mod common;

use auth::Claims;
use auth::Clock;
use chrono::Duration;
use common::TestApp;
use common::PASSWORD;
use common::TTL_MS;
use forum_service::domain::user::models::PrincipalId;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["message"], "User registered successfully");
    assert_eq!(app.repository.len().await, 1);
}

#[tokio::test]
async fn test_register_reports_every_conflict() {
    let app = TestApp::spawn().await;
    app.register("nicola", "nicola@example.com").await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "NICOLA",
            "email": "Nicola@Example.com",
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["data"]["errors"],
        json!(["Username is already taken", "Email is already taken"])
    );
    assert_eq!(app.repository.len().await, 1);
}

#[tokio::test]
async fn test_register_single_conflict() {
    let app = TestApp::spawn().await;
    app.register("nicola", "nicola@example.com").await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "other",
            "email": "nicola@example.com",
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["errors"], json!(["Email is already taken"]));
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "nicola@example.com",
            "password": "password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({
            "username": "nicola",
            "email": "not-an-email",
            "password": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_username_or_email() {
    let app = TestApp::spawn().await;
    app.register("nicola", "nicola@example.com").await;

    for login in ["nicola", "NICOLA", "nicola@example.com", "Nicola@EXAMPLE.com", "  nicola  "] {
        let response = app.login(login, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK, "login {}", login);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        let token = body["data"]["token"].as_str().expect("Missing token");

        assert!(app.token_codec.verify(token));
        assert_eq!(app.token_codec.decode_subject_id(token), Ok(1));
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("nicola", "nicola@example.com").await;

    let wrong_password = app.login("nicola", "Wr0ngPass!").await;
    let unknown_user = app.login("nobody", PASSWORD).await;

    assert_eq!(wrong_password.status(), StatusCode::FORBIDDEN);
    assert_eq!(unknown_user.status(), StatusCode::FORBIDDEN);

    let first: serde_json::Value = wrong_password.json().await.unwrap();
    let second: serde_json::Value = unknown_user.json().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first["data"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/user/profile")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_profile() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("nicola", "nicola@example.com").await;

    let response = app
        .get_authenticated("/user/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["data"],
        json!({ "id": 1, "username": "nicola", "email": "nicola@example.com" })
    );
}

#[tokio::test]
async fn test_unknown_path_requires_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/topics")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_path_with_token_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("nicola", "nicola@example.com").await;

    let response = app
        .get_authenticated("/topics", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_token_for_removed_principal() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("nicola", "nicola@example.com").await;

    app.repository.remove(PrincipalId(1)).await;

    let response = app
        .get_authenticated("/user/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/user/profile", "invalid.token.here")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_expires_after_ttl() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("nicola", "nicola@example.com").await;

    app.clock.advance(Duration::milliseconds(TTL_MS - 1_000));
    let response = app
        .get_authenticated("/user/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    app.clock.advance(Duration::milliseconds(2_000));
    let response = app
        .get_authenticated("/user/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_token_with_non_numeric_subject_is_rejected() {
    let app = TestApp::spawn().await;
    let now = app.clock.now().timestamp();
    let token = app
        .token_codec
        .encode(&Claims {
            sub: "nicola".to_string(),
            iat: now,
            exp: now + 60,
        })
        .unwrap();

    let response = app
        .get_authenticated("/user/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_public_paths_ignore_invalid_token() {
    let app = TestApp::spawn().await;
    app.register("nicola", "nicola@example.com").await;

    let response = app
        .post("/auth/login")
        .bearer_auth("invalid.token.here")
        .json(&json!({ "login": "nicola", "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("nicola", "nicola@example.com").await;

    let response = app
        .put_authenticated("/user/profile", &token)
        .json(&json!({
            "username": "nicola2",
            "email": "nicola2@example.com",
            "password": "N3wPassw0rd!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], "nicola2");
    assert_eq!(body["data"]["email"], "nicola2@example.com");

    // Old token still maps to the same principal.
    let profile = app
        .get_authenticated("/user/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(profile.status(), StatusCode::OK);

    assert_eq!(
        app.login("nicola2", PASSWORD).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.login("nicola2", "N3wPassw0rd!").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_update_profile_without_password_keeps_it() {
    let app = TestApp::spawn().await;
    let token = app.register_and_login("nicola", "nicola@example.com").await;

    let response = app
        .put_authenticated("/user/profile", &token)
        .json(&json!({
            "username": "nicola",
            "email": "NICOLA@example.com",
            "password": ""
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.login("nicola", PASSWORD).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_profile_conflicts() {
    let app = TestApp::spawn().await;
    app.register("other", "other@example.com").await;
    let token = app.register_and_login("nicola", "nicola@example.com").await;

    let response = app
        .put_authenticated("/user/profile", &token)
        .json(&json!({
            "username": "Other",
            "email": "OTHER@example.com"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["data"]["errors"],
        json!(["Username is already taken", "Email is already taken"])
    );
}
