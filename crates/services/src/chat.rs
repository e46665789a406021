//! # Direct Messaging
//!
//! Persists a message first, then fans it out through the `ChatNotifier`
//! port (conversation room plus each online participant). Delivery to
//! offline parties is skipped; there is no store-and-forward.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    conversation_id, AccountRef, AccountRepo, ChatMessage, ChatNotifier, ChatRepo,
    ConversationSummary, DomainError, Result,
};

pub struct ChatService {
    messages: Arc<dyn ChatRepo>,
    accounts: Arc<dyn AccountRepo>,
    notifier: Arc<dyn ChatNotifier>,
}

impl ChatService {
    pub fn new(
        messages: Arc<dyn ChatRepo>,
        accounts: Arc<dyn AccountRepo>,
        notifier: Arc<dyn ChatNotifier>,
    ) -> Self {
        Self {
            messages,
            accounts,
            notifier,
        }
    }

    /// Validates, resolves the receiver across both account collections,
    /// persists, then notifies. The notifier runs after the write so a
    /// broadcast never announces a message that failed to persist.
    pub async fn send(
        &self,
        sender: AccountRef,
        receiver_id: Uuid,
        body: &str,
    ) -> Result<ChatMessage> {
        if body.trim().is_empty() {
            return Err(DomainError::Validation(
                "message body must not be blank".into(),
            ));
        }

        let receiver = self
            .accounts
            .resolve_any(receiver_id)
            .await?
            .ok_or_else(|| DomainError::not_found("account", receiver_id))?;

        let message = ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: conversation_id(sender.id, receiver.id),
            sender,
            receiver: AccountRef {
                kind: receiver.kind,
                id: receiver.id,
            },
            body: body.trim().to_string(),
            created_at: Utc::now(),
        };
        self.messages.insert(message.clone()).await?;
        self.notifier.message_created(&message);
        Ok(message)
    }

    /// Only the sender may delete. A deletion event is broadcast to the
    /// conversation room with no delivery guarantee.
    pub async fn delete(&self, message_id: Uuid, requester: AccountRef) -> Result<()> {
        let message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| DomainError::not_found("message", message_id))?;

        if message.sender.id != requester.id {
            return Err(DomainError::Forbidden(
                "only the sender may delete a message".into(),
            ));
        }

        self.messages.delete(message_id).await?;
        self.notifier
            .message_deleted(&message.conversation_id, message_id);
        Ok(())
    }

    /// Oldest-first transcript of the conversation with one partner.
    pub async fn messages_with(&self, me: Uuid, partner: Uuid) -> Result<Vec<ChatMessage>> {
        self.messages
            .list_conversation(&conversation_id(me, partner))
            .await
    }

    /// Distinct conversation partners with resolved display profiles.
    /// Partners whose accounts have since disappeared are skipped.
    pub async fn conversations(&self, me: Uuid) -> Result<Vec<ConversationSummary>> {
        let involving = self.messages.list_involving(me).await?;

        let mut seen = HashSet::new();
        let mut summaries = Vec::new();
        for message in involving {
            let partner_id = if message.sender.id == me {
                message.receiver.id
            } else {
                message.sender.id
            };
            if !seen.insert(partner_id) {
                continue;
            }
            match self.accounts.resolve_any(partner_id).await? {
                Some(partner) => summaries.push(ConversationSummary {
                    conversation_id: conversation_id(me, partner_id),
                    partner: AccountRef {
                        kind: partner.kind,
                        id: partner.id,
                    },
                    partner_name: partner.name,
                    partner_email: partner.email,
                }),
                None => {
                    tracing::warn!(partner = %partner_id, "conversation partner no longer resolvable");
                }
            }
        }
        Ok(summaries)
    }
}
