//! # api-adapters
//!
//! The web routing and orchestration layer for Wayfarer: axum routers
//! over the services, the `{success, message, data}` response envelope,
//! the bearer-token extractor, and the websocket chat gateway.

pub mod envelope;
pub mod extract;
pub mod handlers;
pub mod realtime;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use domains::{AccountKind, ContentKind};
use services::{
    AuthService, ChatService, CommentService, ContentService, GalleryService, OtpLifecycle,
};

use crate::realtime::ChatGateway;

/// Shared handler state; everything is an `Arc`, so cloning per request
/// is cheap.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub otp: Arc<OtpLifecycle>,
    pub content: Arc<ContentService>,
    pub comments: Arc<CommentService>,
    pub chat: Arc<ChatService>,
    pub gallery: Arc<GalleryService>,
    pub gateway: Arc<ChatGateway>,
}

/// Assembles the full application router.
///
/// The account and content route groups are registered once and mounted
/// per kind with an `Extension` naming the kind, so the handlers stay
/// generic while the URL surface keeps its `/api/user`, `/api/guide`,
/// `/api/blog` etc. shape.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/user", account_routes(AccountKind::Traveler))
        .nest("/guide", account_routes(AccountKind::Guide))
        .nest("/blog", content_routes(ContentKind::Blog))
        .nest("/trip", content_routes(ContentKind::Trip))
        .nest("/package", content_routes(ContentKind::Package))
        .nest("/comment", comment_routes())
        .nest("/chat", chat_routes())
        .route("/gallery", get(handlers::gallery::browse));

    Router::new()
        .nest("/api", api)
        .route("/ws/chat", get(realtime::chat_ws))
        .layer(TraceLayer::new_for_http())
        .layer(cors_policy())
        .with_state(state)
}

fn account_routes(kind: AccountKind) -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/verify", post(handlers::auth::verify))
        .route("/resendOtp", post(handlers::auth::resend_otp))
        .route("/login", post(handlers::auth::login))
        .route("/forgotPassword", post(handlers::auth::forgot_password))
        .route("/resetPassword", post(handlers::auth::reset_password))
        .layer(Extension(kind))
}

fn content_routes(kind: ContentKind) -> Router<AppState> {
    Router::new()
        .route("/create", post(handlers::content::create))
        .route("/", get(handlers::content::list))
        .route("/mine", get(handlers::content::list_mine))
        .route(
            "/{id}",
            get(handlers::content::get)
                .put(handlers::content::update)
                .delete(handlers::content::remove),
        )
        .layer(Extension(kind))
}

fn comment_routes() -> Router<AppState> {
    // One capture serves double duty: a content id for add/list, a
    // comment id for update/remove.
    Router::new()
        .route("/reply/{parentId}", post(handlers::comments::reply))
        .route(
            "/{id}",
            post(handlers::comments::add)
                .get(handlers::comments::list)
                .put(handlers::comments::update)
                .delete(handlers::comments::remove),
        )
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/sendMessage/{receiverId}", post(handlers::chat::send))
        .route("/conversations", get(handlers::chat::conversations))
        .route("/messages/{partnerId}", get(handlers::chat::messages))
        .route("/message/{id}", delete(handlers::chat::remove))
}

/// CORS for a browser frontend on another origin.
fn cors_policy() -> CorsLayer {
    CorsLayer::permissive()
}
