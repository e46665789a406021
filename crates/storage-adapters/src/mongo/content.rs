//! `ContentRepo` over a single `content` collection holding blogs,
//! trips, and packages, discriminated by a `kind` field.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{ContentKind, ContentRecord, ContentRepo, DomainError, MediaAsset, Result};

use super::accounts::parse_id;
use super::{db_err, AccountRefDoc};

#[derive(Debug, Serialize, Deserialize)]
struct MediaAssetDoc {
    url: String,
    public_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentDoc {
    #[serde(rename = "_id")]
    id: String,
    kind: String,
    owner: AccountRefDoc,
    title: String,
    body: String,
    location: Option<String>,
    images: Vec<MediaAssetDoc>,
    tags: Vec<String>,
    cost: Option<f64>,
    duration_days: Option<i64>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl ContentDoc {
    fn from_domain(record: &ContentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            kind: record.kind.as_str().to_string(),
            owner: AccountRefDoc::from_domain(&record.owner),
            title: record.title.clone(),
            body: record.body.clone(),
            location: record.location.clone(),
            images: record
                .images
                .iter()
                .map(|asset| MediaAssetDoc {
                    url: asset.url.clone(),
                    public_id: asset.public_id.clone(),
                })
                .collect(),
            tags: record.tags.clone(),
            cost: record.cost,
            duration_days: record.duration_days,
            created_at: bson::DateTime::from_chrono(record.created_at),
            updated_at: bson::DateTime::from_chrono(record.updated_at),
        }
    }

    fn into_domain(self) -> Result<ContentRecord> {
        Ok(ContentRecord {
            id: parse_id(&self.id)?,
            kind: self
                .kind
                .parse()
                .map_err(|err: String| DomainError::Internal(err))?,
            owner: self.owner.into_domain()?,
            title: self.title,
            body: self.body,
            location: self.location,
            images: self
                .images
                .into_iter()
                .map(|asset| MediaAsset {
                    url: asset.url,
                    public_id: asset.public_id,
                })
                .collect(),
            tags: self.tags,
            cost: self.cost,
            duration_days: self.duration_days,
            created_at: self.created_at.to_chrono(),
            updated_at: self.updated_at.to_chrono(),
        })
    }
}

pub struct MongoContentRepo {
    content: Collection<ContentDoc>,
}

impl MongoContentRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            content: db.collection("content"),
        }
    }

    async fn collect(
        &self,
        filter: bson::Document,
    ) -> Result<Vec<ContentRecord>> {
        let cursor = self
            .content
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(db_err)?;
        let docs: Vec<ContentDoc> = cursor.try_collect().await.map_err(db_err)?;
        docs.into_iter().map(ContentDoc::into_domain).collect()
    }
}

#[async_trait]
impl ContentRepo for MongoContentRepo {
    async fn insert(&self, record: ContentRecord) -> Result<()> {
        self.content
            .insert_one(ContentDoc::from_domain(&record))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update(&self, record: ContentRecord) -> Result<()> {
        let replaced = self
            .content
            .replace_one(
                doc! { "_id": record.id.to_string() },
                ContentDoc::from_domain(&record),
            )
            .await
            .map_err(db_err)?;
        if replaced.matched_count == 0 {
            return Err(DomainError::not_found("content record", record.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let deleted = self
            .content
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(db_err)?;
        if deleted.deleted_count == 0 {
            return Err(DomainError::not_found("content record", id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentRecord>> {
        let found = self
            .content
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(db_err)?;
        found.map(ContentDoc::into_domain).transpose()
    }

    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentRecord>> {
        self.collect(doc! { "kind": kind.as_str() }).await
    }

    async fn list_by_owner(&self, kind: ContentKind, owner: Uuid) -> Result<Vec<ContentRecord>> {
        self.collect(doc! { "kind": kind.as_str(), "owner.id": owner.to_string() })
            .await
    }

    async fn list_all(&self) -> Result<Vec<ContentRecord>> {
        self.collect(doc! {}).await
    }
}
