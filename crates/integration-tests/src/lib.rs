//! # integration-tests
//!
//! Shared fixtures for exercising the assembled router over mocked ports.
//! Each file under `tests/` covers one route group end to end: request in,
//! envelope out, with the real services in between.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use api_adapters::realtime::ChatGateway;
use api_adapters::AppState;
use domains::{
    Account, AccountKind, AccountRepo, ChatRepo, CommentRepo, ContentRepo, CredentialHasher,
    MediaHost, MockAccountRepo, MockChatRepo, MockCommentRepo, MockContentRepo,
    MockCredentialHasher, MockMailer, MockMediaHost, MockTokenIssuer, SessionClaims, TokenIssuer,
};
use services::{
    AuthService, ChatService, CommentService, ContentService, GalleryService, OtpLifecycle,
};

/// The bearer token every fixture session uses.
pub const TOKEN: &str = "fixture-session-token";

/// One mock per port; set expectations, then hand the lot to [`app`].
pub struct Ports {
    pub accounts: MockAccountRepo,
    pub records: MockContentRepo,
    pub comments: MockCommentRepo,
    pub messages: MockChatRepo,
    pub media: MockMediaHost,
    pub mailer: MockMailer,
    pub hasher: MockCredentialHasher,
    pub tokens: MockTokenIssuer,
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            accounts: MockAccountRepo::new(),
            records: MockContentRepo::new(),
            comments: MockCommentRepo::new(),
            messages: MockChatRepo::new(),
            media: MockMediaHost::new(),
            mailer: MockMailer::new(),
            hasher: MockCredentialHasher::new(),
            tokens: MockTokenIssuer::new(),
        }
    }
}

impl Ports {
    /// Wires `TOKEN` to authenticate as `account`: the token decodes to
    /// its claims and the account lookup finds it.
    pub fn allow_session(&mut self, account: &Account) {
        let claims = SessionClaims {
            account_id: account.id,
            email: account.email.clone(),
            kind: account.kind,
        };
        self.tokens
            .expect_decode()
            .withf(|token| token == TOKEN)
            .returning(move |_| Ok(claims.clone()));

        let found = account.clone();
        self.accounts
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(found.clone())));
    }
}

/// Full router over the given mocks, exactly as the binary assembles it.
pub fn app(ports: Ports) -> Router {
    let accounts: Arc<dyn AccountRepo> = Arc::new(ports.accounts);
    let records: Arc<dyn ContentRepo> = Arc::new(ports.records);
    let comments: Arc<dyn CommentRepo> = Arc::new(ports.comments);
    let messages: Arc<dyn ChatRepo> = Arc::new(ports.messages);
    let media: Arc<dyn MediaHost> = Arc::new(ports.media);
    let hasher: Arc<dyn CredentialHasher> = Arc::new(ports.hasher);
    let tokens: Arc<dyn TokenIssuer> = Arc::new(ports.tokens);

    let gateway = Arc::new(ChatGateway::new());
    let otp = Arc::new(OtpLifecycle::new(
        accounts.clone(),
        Arc::new(ports.mailer),
        hasher.clone(),
    ));
    let state = AppState {
        auth: Arc::new(AuthService::new(
            accounts.clone(),
            hasher,
            tokens,
            otp.clone(),
        )),
        otp,
        content: Arc::new(ContentService::new(records.clone(), media)),
        comments: Arc::new(CommentService::new(comments, records.clone())),
        chat: Arc::new(ChatService::new(messages, accounts, gateway.clone())),
        gallery: Arc::new(GalleryService::new(records)),
        gateway,
    };
    api_adapters::router(state)
}

/// A verified account with the guide-only fields populated when relevant.
pub fn verified_account(kind: AccountKind) -> Account {
    Account {
        id: Uuid::now_v7(),
        kind,
        name: "Nadia".into(),
        email: "nadia@example.com".into(),
        password_hash: "$argon2id$stub".into(),
        is_verified: true,
        otp: None,
        speciality: (kind == AccountKind::Guide).then(|| "alpine trekking".to_string()),
        rate_per_day: (kind == AccountKind::Guide).then_some(150.0),
        created_at: Utc::now(),
    }
}

/// Fires one JSON request at the router and decodes the envelope.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
