//! # MongoDB adapters
//!
//! One repository per collection. Persistence document shapes live here,
//! not in `domains`. Ids are stored as canonical UUID strings and
//! timestamps as native BSON datetimes.

mod accounts;
mod chat;
mod comments;
mod content;

pub use accounts::MongoAccountRepo;
pub use chat::MongoChatRepo;
pub use comments::MongoCommentRepo;
pub use content::MongoContentRepo;

use mongodb::{Client, Database};

use domains::DomainError;

/// Connects and selects the application database. The driver pools
/// connections internally; one `Database` handle is shared everywhere.
pub async fn connect(uri: &str, name: &str) -> Result<Database, DomainError> {
    let client = Client::with_uri_str(uri).await.map_err(db_err)?;
    Ok(client.database(name))
}

/// Driver failures carry no domain meaning; they all map to `Internal`.
pub(crate) fn db_err(err: mongodb::error::Error) -> DomainError {
    DomainError::Internal(format!("database error: {err}"))
}

/// Serialization failures while building documents.
pub(crate) fn bson_err(err: mongodb::bson::ser::Error) -> DomainError {
    DomainError::Internal(format!("bson encoding error: {err}"))
}

use serde::{Deserialize, Serialize};

/// Stored form of `domains::AccountRef`. The explicit kind tag replaces
/// any dynamic-reference lookup.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AccountRefDoc {
    pub kind: String,
    pub id: String,
}

impl AccountRefDoc {
    pub(crate) fn from_domain(account_ref: &domains::AccountRef) -> Self {
        Self {
            kind: account_ref.kind.as_str().to_string(),
            id: account_ref.id.to_string(),
        }
    }

    pub(crate) fn into_domain(self) -> Result<domains::AccountRef, DomainError> {
        Ok(domains::AccountRef {
            kind: self
                .kind
                .parse()
                .map_err(|err: String| DomainError::Internal(err))?,
            id: accounts::parse_id(&self.id)?,
        })
    }
}
