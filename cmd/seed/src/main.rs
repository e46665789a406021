//! # seed
//!
//! Inserts a verified demo traveler and guide so a fresh database is
//! immediately usable. Safe to re-run: existing emails are skipped.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use uuid::Uuid;

use auth_adapters::Argon2Hasher;
use configs::AppConfig;
use domains::{Account, AccountKind, AccountRepo, CredentialHasher};
use storage_adapters::MongoAccountRepo;

const DEMO_PASSWORD: &str = "wayfarer-demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    let db = storage_adapters::connect(&config.database.uri, &config.database.name)
        .await
        .context("failed to connect to MongoDB")?;
    let accounts = Arc::new(MongoAccountRepo::new(&db));

    seed_account(
        &accounts,
        AccountKind::Traveler,
        "Demo Traveler",
        "traveler@example.com",
        None,
        None,
    )
    .await?;
    seed_account(
        &accounts,
        AccountKind::Guide,
        "Demo Guide",
        "guide@example.com",
        Some("mountain trekking".to_string()),
        Some(120.0),
    )
    .await?;

    println!("seeded demo accounts (password: {DEMO_PASSWORD})");
    Ok(())
}

async fn seed_account(
    accounts: &Arc<MongoAccountRepo>,
    kind: AccountKind,
    name: &str,
    email: &str,
    speciality: Option<String>,
    rate_per_day: Option<f64>,
) -> anyhow::Result<()> {
    if accounts.find_by_email(kind, email).await?.is_some() {
        println!("{email} already exists, skipping");
        return Ok(());
    }

    let account = Account {
        id: Uuid::now_v7(),
        kind,
        name: name.to_string(),
        email: email.to_string(),
        password_hash: Argon2Hasher
            .hash(DEMO_PASSWORD)
            .context("failed to hash demo password")?,
        is_verified: true,
        otp: None,
        speciality,
        rate_per_day,
        created_at: Utc::now(),
    };
    accounts.insert(account).await?;
    println!("created {} {email}", kind.as_str());
    Ok(())
}
