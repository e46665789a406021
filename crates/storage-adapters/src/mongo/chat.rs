//! `ChatRepo` over the `messages` collection.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{ChatMessage, ChatRepo, DomainError, Result};

use super::accounts::parse_id;
use super::{db_err, AccountRefDoc};

#[derive(Debug, Serialize, Deserialize)]
struct MessageDoc {
    #[serde(rename = "_id")]
    id: String,
    conversation_id: String,
    sender: AccountRefDoc,
    receiver: AccountRefDoc,
    body: String,
    created_at: bson::DateTime,
}

impl MessageDoc {
    fn from_domain(message: &ChatMessage) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.clone(),
            sender: AccountRefDoc::from_domain(&message.sender),
            receiver: AccountRefDoc::from_domain(&message.receiver),
            body: message.body.clone(),
            created_at: bson::DateTime::from_chrono(message.created_at),
        }
    }

    fn into_domain(self) -> Result<ChatMessage> {
        Ok(ChatMessage {
            id: parse_id(&self.id)?,
            conversation_id: self.conversation_id,
            sender: self.sender.into_domain()?,
            receiver: self.receiver.into_domain()?,
            body: self.body,
            created_at: self.created_at.to_chrono(),
        })
    }
}

pub struct MongoChatRepo {
    messages: Collection<MessageDoc>,
}

impl MongoChatRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            messages: db.collection("messages"),
        }
    }

    async fn collect(
        &self,
        filter: bson::Document,
        order: i32,
    ) -> Result<Vec<ChatMessage>> {
        let cursor = self
            .messages
            .find(filter)
            .sort(doc! { "created_at": order })
            .await
            .map_err(db_err)?;
        let docs: Vec<MessageDoc> = cursor.try_collect().await.map_err(db_err)?;
        docs.into_iter().map(MessageDoc::into_domain).collect()
    }
}

#[async_trait]
impl ChatRepo for MongoChatRepo {
    async fn insert(&self, message: ChatMessage) -> Result<()> {
        self.messages
            .insert_one(MessageDoc::from_domain(&message))
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChatMessage>> {
        let found = self
            .messages
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(db_err)?;
        found.map(MessageDoc::into_domain).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let deleted = self
            .messages
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(db_err)?;
        if deleted.deleted_count == 0 {
            return Err(DomainError::not_found("message", id));
        }
        Ok(())
    }

    async fn list_conversation(&self, conversation_id: &str) -> Result<Vec<ChatMessage>> {
        self.collect(doc! { "conversation_id": conversation_id }, 1)
            .await
    }

    async fn list_involving(&self, account_id: Uuid) -> Result<Vec<ChatMessage>> {
        let id = account_id.to_string();
        self.collect(
            doc! { "$or": [ { "sender.id": &id }, { "receiver.id": &id } ] },
            -1,
        )
        .await
    }
}
