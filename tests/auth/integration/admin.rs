//! Administrative operations and audit listing.

use axum::http::{Method, StatusCode};
use gatehouse::auth::credential::StoredCredential;
use gatehouse::storage::repositories::{AccountRepository, AuditAction};
use serde_json::json;

use crate::support::*;

#[tokio::test]
async fn kick_unknown_target_is_not_found() {
    let app = setup_test_app().await;
    seed_account(&app, "admin@x.com", "Admin", StoredCredential::Legacy("root".into()), true)
        .await;
    let token = login_token(&app, "admin@x.com", "root").await;

    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/accounts/kick",
        Some(&token),
        Some(json!({ "email": "ghost@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn reset_attempts_zeroes_counter_and_audits_actor() {
    let app = setup_test_app().await;
    let target =
        seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("pw1".into()), true).await;
    let admin =
        seed_account(&app, "admin@x.com", "Admin", StoredCredential::Legacy("root".into()), true)
            .await;
    let token = login_token(&app, "admin@x.com", "root").await;

    for _ in 0..3 {
        let (status, _) = send_request(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let state = app.accounts.get_by_id(&target.id).await.unwrap().unwrap();
    assert_eq!(state.failed_attempts, 3);

    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/accounts/reset-attempts",
        Some(&token),
        Some(json!({ "accountId": target.id.as_str() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let state = app.accounts.get_by_id(&target.id).await.unwrap().unwrap();
    assert_eq!(state.failed_attempts, 0);

    let entries = audit_entries(&app, &admin).await;
    let reset =
        entries.iter().find(|entry| entry.action == AuditAction::ResetFailedAttempts).unwrap();
    assert!(reset.detail.contains(target.id.as_str()));
}

#[tokio::test]
async fn active_accounts_lists_only_valid_sessions() {
    let app = setup_test_app().await;
    seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("pw-a".into()), true).await;
    seed_account(&app, "b@x.com", "Bob", StoredCredential::Legacy("pw-b".into()), true).await;
    seed_account(&app, "c@x.com", "Cara", StoredCredential::Legacy("pw-c".into()), true).await;

    let token_a = login_token(&app, "a@x.com", "pw-a").await;
    let token_b = login_token(&app, "b@x.com", "pw-b").await;

    let (status, _) =
        send_request(&app, Method::POST, "/api/v1/auth/logout", Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        send_request(&app, Method::GET, "/api/v1/accounts/active", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> =
        body.as_array().unwrap().iter().map(|p| p["email"].as_str().unwrap()).collect();
    assert_eq!(emails, vec!["a@x.com"]);
}

#[tokio::test]
async fn audit_listing_filters_by_account() {
    let app = setup_test_app().await;
    let alice =
        seed_account(&app, "a@x.com", "Alice", StoredCredential::Legacy("pw-a".into()), true).await;
    seed_account(&app, "b@x.com", "Bob", StoredCredential::Legacy("pw-b".into()), true).await;

    let token_a = login_token(&app, "a@x.com", "pw-a").await;
    login_token(&app, "b@x.com", "pw-b").await;

    let uri = format!("/api/v1/audit?accountId={}", alice.id);
    let (status, body) = send_request(&app, Method::GET, &uri, Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "LOGIN");
    assert_eq!(entries[0]["accountId"], alice.id.as_str());

    let (status, body) = send_request(&app, Method::GET, "/api/v1/audit", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Pagination clamps apply
    let (status, body) =
        send_request(&app, Method::GET, "/api/v1/audit?limit=1", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn audit_endpoint_requires_authentication() {
    let app = setup_test_app().await;
    let (status, _) = send_request(&app, Method::GET, "/api/v1/audit", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = setup_test_app().await;

    let (status, body) = send_request(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) =
        send_request(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/auth/login"].is_object());
}
