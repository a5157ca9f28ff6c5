//! Login and password rotation flows over the HTTP surface.

use axum::http::{Method, StatusCode};
use gatehouse::auth::credential::{self, StoredCredential};
use gatehouse::storage::repositories::{AccountRepository, AuditAction};
use serde_json::json;

use crate::support::*;

#[tokio::test]
async fn legacy_login_migrates_credential_and_establishes_session() {
    let app = setup_test_app().await;
    let account =
        seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("pw1".into()), true).await;

    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "pw1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["principal"]["email"], "a@x.com");
    assert_eq!(body["principal"]["loggedIn"], true);
    assert_eq!(body["principal"]["failedAttempts"], 0);
    // Credential material never rides on the response
    assert!(body["principal"].get("credential").is_none());

    // The stored encoding migrated to hashed and still verifies
    let (kind, secret) = stored_credential(&app, "a@x.com").await;
    assert_eq!(kind, "argon2");
    assert!(secret.starts_with("$argon2id$"));

    let refreshed = app.accounts.get_by_id(&account.id).await.unwrap().unwrap();
    assert!(refreshed.logged_in);
    assert_eq!(refreshed.session_epoch, 1);
    assert_eq!(refreshed.failed_attempts, 0);
    assert!(refreshed.last_login.is_some());

    let entries = audit_entries(&app, &account).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Login);
}

#[tokio::test]
async fn migration_happens_once_and_subsequent_logins_still_succeed() {
    let app = setup_test_app().await;
    seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("pw1".into()), true).await;

    login_token(&app, "a@x.com", "pw1").await;
    let (_, first_hash) = stored_credential(&app, "a@x.com").await;

    login_token(&app, "a@x.com", "pw1").await;
    let (kind, second_hash) = stored_credential(&app, "a@x.com").await;

    // Second login ran the hashed path: no further migration, hash untouched
    assert_eq!(kind, "argon2");
    assert_eq!(first_hash, second_hash);
}

#[tokio::test]
async fn hashed_login_succeeds_and_wrong_password_counts_one_attempt() {
    let app = setup_test_app().await;
    let hash = credential::rehash("correct").unwrap();
    let account =
        seed_account(&app, "a@x.com", "Alice", StoredCredential::Hashed(hash), true).await;

    login_token(&app, "a@x.com", "correct").await;

    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let refreshed = app.accounts.get_by_id(&account.id).await.unwrap().unwrap();
    assert_eq!(refreshed.failed_attempts, 1);
    // The failed attempt does not disturb the session established before it
    assert!(refreshed.logged_in);

    let entries = audit_entries(&app, &account).await;
    assert_eq!(entries[0].action, AuditAction::LoginFailed);
    assert!(entries[0].detail.contains("Attempt: 1"));
}

#[tokio::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let app = setup_test_app().await;
    seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("pw1".into()), true).await;

    let (status_unknown, body_unknown) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "ghost@x.com", "password": "pw1" })),
    )
    .await;
    let (status_wrong, body_wrong) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "nope" })),
    )
    .await;

    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(status_wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(body_unknown["message"], body_wrong["message"]);
}

#[tokio::test]
async fn inactive_account_cannot_login_even_with_correct_password() {
    let app = setup_test_app().await;
    seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("pw1".into()), false).await;

    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "account is inactive");

    // No migration happened for the rejected login
    let (kind, _) = stored_credential(&app, "a@x.com").await;
    assert_eq!(kind, "plaintext");
}

#[tokio::test]
async fn change_password_rotates_credential() {
    let app = setup_test_app().await;
    let account =
        seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("old-pw".into()), true)
            .await;
    let token = login_token(&app, "a@x.com", "old-pw").await;

    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/change-password",
        Some(&token),
        Some(json!({ "oldPassword": "old-pw", "newPassword": "new-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // New password works, old one is now invalid
    login_token(&app, "a@x.com", "new-pw").await;
    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "old-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let entries = audit_entries(&app, &account).await;
    assert!(entries.iter().any(|entry| entry.action == AuditAction::ChangePassword));
}

#[tokio::test]
async fn change_password_with_wrong_old_never_mutates_credential() {
    let app = setup_test_app().await;
    seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("old-pw".into()), true).await;
    let token = login_token(&app, "a@x.com", "old-pw").await;
    let before = stored_credential(&app, "a@x.com").await;

    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/change-password",
        Some(&token),
        Some(json!({ "oldPassword": "not-it", "newPassword": "new-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(stored_credential(&app, "a@x.com").await, before);
}

#[tokio::test]
async fn change_password_keeps_existing_session_valid() {
    let app = setup_test_app().await;
    seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("old-pw".into()), true).await;
    let token = login_token(&app, "a@x.com", "old-pw").await;

    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/change-password",
        Some(&token),
        Some(json!({ "oldPassword": "old-pw", "newPassword": "new-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The rotation does not touch session state: the token still passes the gate
    let (status, body) =
        send_request(&app, Method::GET, "/api/v1/accounts/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@x.com");
}

#[tokio::test]
async fn login_request_validation_rejects_garbage() {
    let app = setup_test_app().await;

    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "not-an-email", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
