//! # Wayfarer Binary
//!
//! The entry point that assembles the application: configuration, the
//! MongoDB repositories, the media and email clients, the service layer,
//! and the axum router.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use api_adapters::realtime::ChatGateway;
use api_adapters::AppState;
use auth_adapters::{Argon2Hasher, JwtIssuer};
use configs::AppConfig;
use services::{
    AuthService, ChatService, CommentService, ContentService, GalleryService, OtpLifecycle,
};
use storage_adapters::{
    HttpMailer, MongoAccountRepo, MongoChatRepo, MongoCommentRepo, MongoContentRepo,
    RemoteMediaHost,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    // 1. Outbound adapters
    let db = storage_adapters::connect(&config.database.uri, &config.database.name)
        .await
        .context("failed to connect to MongoDB")?;
    let accounts = Arc::new(MongoAccountRepo::new(&db));
    let records = Arc::new(MongoContentRepo::new(&db));
    let comments = Arc::new(MongoCommentRepo::new(&db));
    let messages = Arc::new(MongoChatRepo::new(&db));

    let media = Arc::new(RemoteMediaHost::new(
        &config.media.base_url,
        config.media.api_key.expose_secret(),
        &config.media.folder,
    ));
    let mailer = Arc::new(HttpMailer::new(
        &config.email.base_url,
        config.email.api_key.expose_secret(),
        &config.email.from_address,
    ));

    // 2. Auth adapters
    let hasher = Arc::new(Argon2Hasher);
    let tokens = Arc::new(JwtIssuer::new(config.auth.jwt_secret.expose_secret()));

    // 3. Services
    let gateway = Arc::new(ChatGateway::new());
    let otp = Arc::new(OtpLifecycle::new(
        accounts.clone(),
        mailer,
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

    // 4. Serve
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "wayfarer listening");

    axum::serve(listener, api_adapters::router(state))
        .await
        .context("server error")?;

    Ok(())
}
