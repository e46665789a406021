//! Signup, verification, and login over the assembled router.

use axum::http::{Method, StatusCode};
use serde_json::json;

use domains::{AccountKind, DomainError};
use integration_tests::{app, send_json, verified_account, Ports, TOKEN};

#[tokio::test]
async fn signup_creates_account_and_issues_otp() {
    let mut ports = Ports::default();

    // duplicate check first, then the OTP issue re-reads the account
    ports
        .accounts
        .expect_find_by_email()
        .times(1)
        .returning(|_, _| Ok(None));
    let mut fresh = verified_account(AccountKind::Traveler);
    fresh.is_verified = false;
    ports
        .accounts
        .expect_find_by_email()
        .times(1)
        .returning(move |_, _| Ok(Some(fresh.clone())));

    ports
        .hasher
        .expect_hash()
        .returning(|_| Ok("$argon2id$stub".into()));
    ports.accounts.expect_insert().times(1).returning(|_| Ok(()));
    ports
        .accounts
        .expect_set_otp()
        .times(1)
        .returning(|_, _, _| Ok(()));
    ports.mailer.expect_send().times(1).returning(|_, _, _| Ok(()));

    let app = app(ports);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/user/signup",
        None,
        Some(json!({
            "userName": "Nadia",
            "userEmail": "nadia@example.com",
            "password": "wanderlust1"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let mut ports = Ports::default();
    let existing = verified_account(AccountKind::Guide);
    ports
        .accounts
        .expect_find_by_email()
        .returning(move |_, _| Ok(Some(existing.clone())));
    ports.accounts.expect_insert().never();

    let app = app(ports);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/guide/signup",
        None,
        Some(json!({
            "userName": "Nadia",
            "userEmail": "nadia@example.com",
            "password": "wanderlust1"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_returns_user_and_token() {
    let mut ports = Ports::default();
    let account = verified_account(AccountKind::Traveler);
    let found = account.clone();
    ports
        .accounts
        .expect_find_by_email()
        .returning(move |_, _| Ok(Some(found.clone())));
    ports.hasher.expect_verify().returning(|_, _| true);
    ports
        .tokens
        .expect_issue()
        .returning(|_| Ok("signed.jwt.here".into()));

    let app = app(ports);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/user/login",
        None,
        Some(json!({
            "userEmail": "nadia@example.com",
            "password": "wanderlust1"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token"], "signed.jwt.here");
    assert_eq!(body["data"]["user"]["userEmail"], "nadia@example.com");
    // the hash never leaves the server
    assert!(body["data"]["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn unverified_login_is_forbidden() {
    let mut ports = Ports::default();
    let mut account = verified_account(AccountKind::Traveler);
    account.is_verified = false;
    ports
        .accounts
        .expect_find_by_email()
        .returning(move |_, _| Ok(Some(account.clone())));
    ports.hasher.expect_verify().returning(|_, _| true);
    ports.tokens.expect_issue().never();

    let app = app(ports);
    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/user/login",
        None,
        Some(json!({
            "userEmail": "nadia@example.com",
            "password": "wanderlust1"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = app(Ports::default());
    let (status, body) = send_json(&app, Method::GET, "/api/blog/mine", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let mut ports = Ports::default();
    ports
        .tokens
        .expect_decode()
        .returning(|_| Err(DomainError::Auth("bad signature".into())));

    let app = app(ports);
    let (status, _) = send_json(
        &app,
        Method::GET,
        "/api/blog/mine",
        Some("not-a-real-token"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleted_accounts_cannot_use_stale_tokens() {
    let mut ports = Ports::default();
    let account = verified_account(AccountKind::Guide);

    // the token still decodes, but the account is gone
    let claims = domains::SessionClaims {
        account_id: account.id,
        email: account.email.clone(),
        kind: account.kind,
    };
    ports
        .tokens
        .expect_decode()
        .returning(move |_| Ok(claims.clone()));
    ports
        .accounts
        .expect_find_by_id()
        .returning(|_, _| Ok(None));

    let app = app(ports);
    let (status, _) = send_json(&app, Method::GET, "/api/blog/mine", Some(TOKEN), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
