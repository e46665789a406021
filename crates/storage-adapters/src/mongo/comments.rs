//! `CommentRepo` over the `comments` collection. The cascade delete is a
//! single `delete_many` matching the comment or anything replying to it.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{Comment, CommentRepo, DomainError, Result};

use super::accounts::parse_id;
use super::{db_err, AccountRefDoc};

#[derive(Debug, Serialize, Deserialize)]
struct CommentDoc {
    #[serde(rename = "_id")]
    id: String,
    content_id: String,
    author: AccountRefDoc,
    /// Stored as null for top-level comments so `parent_id: null` queries
    /// match directly.
    parent_id: Option<String>,
    to_user: Option<AccountRefDoc>,
    body: String,
    created_at: bson::DateTime,
}

impl CommentDoc {
    fn from_domain(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            content_id: comment.content_id.to_string(),
            author: AccountRefDoc::from_domain(&comment.author),
            parent_id: comment.parent_id.map(|id| id.to_string()),
            to_user: comment.to_user.as_ref().map(AccountRefDoc::from_domain),
            body: comment.body.clone(),
            created_at: bson::DateTime::from_chrono(comment.created_at),
        }
    }

    fn into_domain(self) -> Result<Comment> {
        Ok(Comment {
            id: parse_id(&self.id)?,
            content_id: parse_id(&self.content_id)?,
            author: self.author.into_domain()?,
            parent_id: self.parent_id.as_deref().map(parse_id).transpose()?,
            to_user: self.to_user.map(AccountRefDoc::into_domain).transpose()?,
            body: self.body,
            created_at: self.created_at.to_chrono(),
        })
    }
}

pub struct MongoCommentRepo {
    comments: Collection<CommentDoc>,
}

impl MongoCommentRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            comments: db.collection("comments"),
        }
    }

    async fn collect(&self, filter: bson::Document, newest_first: bool) -> Result<Vec<Comment>> {
        let order = if newest_first { -1 } else { 1 };
        let cursor = self
            .comments
            .find(filter)
            .sort(doc! { "created_at": order })
            .await
            .map_err(db_err)?;
        let docs: Vec<CommentDoc> = cursor.try_collect().await.map_err(db_err)?;
        docs.into_iter().map(CommentDoc::into_domain).collect()
    }
}

#[async_trait]
impl CommentRepo for MongoCommentRepo {
    async fn insert(&self, comment: Comment) -> Result<()> {
        self.comments
            .insert_one(CommentDoc::from_domain(&comment))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let found = self
            .comments
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(db_err)?;
        found.map(CommentDoc::into_domain).transpose()
    }

    async fn update_body(&self, id: Uuid, body: &str) -> Result<()> {
        let updated = self
            .comments
            .update_one(
                doc! { "_id": id.to_string() },
                doc! { "$set": { "body": body } },
            )
            .await
            .map_err(db_err)?;
        if updated.matched_count == 0 {
            return Err(DomainError::not_found("comment", id));
        }
        Ok(())
    }

    async fn delete_with_replies(&self, id: Uuid) -> Result<u64> {
        let id = id.to_string();
        let deleted = self
            .comments
            .delete_many(doc! { "$or": [ { "_id": &id }, { "parent_id": &id } ] })
            .await
            .map_err(db_err)?;
        Ok(deleted.deleted_count)
    }

    async fn list_top_level(&self, content_id: Uuid) -> Result<Vec<Comment>> {
        self.collect(
            doc! { "content_id": content_id.to_string(), "parent_id": null },
            true,
        )
        .await
    }

    async fn list_replies(&self, parent_id: Uuid) -> Result<Vec<Comment>> {
        self.collect(doc! { "parent_id": parent_id.to_string() }, false)
            .await
    }
}
