//! `AccountRepo` over the `users` and `guides` collections.
//!
//! Both collections share one document shape; the kind is implied by
//! which collection a document lives in and re-attached on the way out.

use async_trait::async_trait;
use mongodb::bson::{self, doc};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{Account, AccountKind, AccountRepo, DomainError, OtpState, Result};

use super::{bson_err, db_err};

#[derive(Debug, Serialize, Deserialize)]
struct OtpDoc {
    code_hash: String,
    expires_at: bson::DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccountDoc {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    email: String,
    password_hash: String,
    is_verified: bool,
    otp: Option<OtpDoc>,
    speciality: Option<String>,
    rate_per_day: Option<f64>,
    created_at: bson::DateTime,
}

impl AccountDoc {
    fn from_domain(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            is_verified: account.is_verified,
            otp: account.otp.as_ref().map(|otp| OtpDoc {
                code_hash: otp.code_hash.clone(),
                expires_at: bson::DateTime::from_chrono(otp.expires_at),
            }),
            speciality: account.speciality.clone(),
            rate_per_day: account.rate_per_day,
            created_at: bson::DateTime::from_chrono(account.created_at),
        }
    }

    fn into_domain(self, kind: AccountKind) -> Result<Account> {
        Ok(Account {
            id: parse_id(&self.id)?,
            kind,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_verified: self.is_verified,
            otp: self.otp.map(|otp| OtpState {
                code_hash: otp.code_hash,
                expires_at: otp.expires_at.to_chrono(),
            }),
            speciality: self.speciality,
            rate_per_day: self.rate_per_day,
            created_at: self.created_at.to_chrono(),
        })
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|_| DomainError::Internal(format!("malformed id in database: {raw}")))
}

pub struct MongoAccountRepo {
    travelers: Collection<AccountDoc>,
    guides: Collection<AccountDoc>,
}

impl MongoAccountRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            travelers: db.collection("users"),
            guides: db.collection("guides"),
        }
    }

    fn collection(&self, kind: AccountKind) -> &Collection<AccountDoc> {
        match kind {
            AccountKind::Traveler => &self.travelers,
            AccountKind::Guide => &self.guides,
        }
    }
}

#[async_trait]
impl AccountRepo for MongoAccountRepo {
    async fn insert(&self, account: Account) -> Result<()> {
        self.collection(account.kind)
            .insert_one(AccountDoc::from_domain(&account))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_email(&self, kind: AccountKind, email: &str) -> Result<Option<Account>> {
        let found = self
            .collection(kind)
            .find_one(doc! { "email": email.trim().to_lowercase() })
            .await
            .map_err(db_err)?;
        found.map(|doc| doc.into_domain(kind)).transpose()
    }

    async fn find_by_id(&self, kind: AccountKind, id: Uuid) -> Result<Option<Account>> {
        let found = self
            .collection(kind)
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(db_err)?;
        found.map(|doc| doc.into_domain(kind)).transpose()
    }

    /// Travelers first, then guides: the lookup order the chat flow relies on.
    async fn resolve_any(&self, id: Uuid) -> Result<Option<Account>> {
        if let Some(account) = self.find_by_id(AccountKind::Traveler, id).await? {
            return Ok(Some(account));
        }
        self.find_by_id(AccountKind::Guide, id).await
    }

    async fn set_otp(&self, kind: AccountKind, id: Uuid, otp: OtpState) -> Result<()> {
        let otp = bson::to_bson(&OtpDoc {
            code_hash: otp.code_hash,
            expires_at: bson::DateTime::from_chrono(otp.expires_at),
        })
        .map_err(bson_err)?;

        let updated = self
            .collection(kind)
            .update_one(doc! { "_id": id.to_string() }, doc! { "$set": { "otp": otp } })
            .await
            .map_err(db_err)?;
        if updated.matched_count == 0 {
            return Err(DomainError::not_found("account", id));
        }
        Ok(())
    }

    async fn mark_verified(&self, kind: AccountKind, id: Uuid) -> Result<()> {
        let updated = self
            .collection(kind)
            .update_one(
                doc! { "_id": id.to_string() },
                doc! { "$set": { "is_verified": true, "otp": null } },
            )
            .await
            .map_err(db_err)?;
        if updated.matched_count == 0 {
            return Err(DomainError::not_found("account", id));
        }
        Ok(())
    }

    async fn reset_credentials(
        &self,
        kind: AccountKind,
        id: Uuid,
        password_hash: &str,
    ) -> Result<()> {
        let updated = self
            .collection(kind)
            .update_one(
                doc! { "_id": id.to_string() },
                doc! { "$set": {
                    "password_hash": password_hash,
                    "is_verified": true,
                    "otp": null,
                } },
            )
            .await
            .map_err(db_err)?;
        if updated.matched_count == 0 {
            return Err(DomainError::not_found("account", id));
        }
        Ok(())
    }
}
