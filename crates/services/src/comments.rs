//! # Comment Threading
//!
//! Two-level discussions under a content record: top-level comments plus
//! one flat reply list each. Replies never nest further; this is enforced by how
//! replies are fetched, not by schema.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    AccountRef, Comment, CommentRepo, CommentThread, ContentRepo, DomainError, Result,
};

pub struct CommentService {
    comments: Arc<dyn CommentRepo>,
    records: Arc<dyn ContentRepo>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepo>, records: Arc<dyn ContentRepo>) -> Self {
        Self { comments, records }
    }

    /// Creates a top-level comment (`parent_id = None`).
    pub async fn add_top_level(
        &self,
        content_id: Uuid,
        author: AccountRef,
        body: &str,
    ) -> Result<Comment> {
        require_body(body)?;
        if self.records.find_by_id(content_id).await?.is_none() {
            return Err(DomainError::not_found("content record", content_id));
        }

        let comment = Comment {
            id: Uuid::now_v7(),
            content_id,
            author,
            parent_id: None,
            to_user: None,
            body: body.trim().to_string(),
            created_at: Utc::now(),
        };
        self.comments.insert(comment.clone()).await?;
        Ok(comment)
    }

    /// Creates a reply anchored to `parent_id`. When `to_user` is not
    /// supplied it defaults to the parent's author, so a reply deep in a
    /// busy thread still names who it addresses.
    pub async fn reply(
        &self,
        parent_id: Uuid,
        author: AccountRef,
        body: &str,
        to_user: Option<AccountRef>,
    ) -> Result<Comment> {
        require_body(body)?;
        let parent = self
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", parent_id))?;

        let comment = Comment {
            id: Uuid::now_v7(),
            content_id: parent.content_id,
            author,
            parent_id: Some(parent.id),
            to_user: to_user.or(Some(parent.author)),
            body: body.trim().to_string(),
            created_at: Utc::now(),
        };
        self.comments.insert(comment.clone()).await?;
        Ok(comment)
    }

    /// Top-level comments newest first, each with its flat reply list.
    /// Replies are fetched per parent, one query each, matching the
    /// shallow-tree shape instead of a general recursion.
    pub async fn list_for_content(&self, content_id: Uuid) -> Result<Vec<CommentThread>> {
        let top_level = self.comments.list_top_level(content_id).await?;
        let mut threads = Vec::with_capacity(top_level.len());
        for comment in top_level {
            let replies = self.comments.list_replies(comment.id).await?;
            threads.push(CommentThread { comment, replies });
        }
        Ok(threads)
    }

    pub async fn update(&self, comment_id: Uuid, requester: AccountRef, body: &str) -> Result<()> {
        require_body(body)?;
        self.require_owned(comment_id, requester).await?;
        self.comments.update_body(comment_id, body.trim()).await
    }

    /// Deletes the comment and cascades to every reply anchored to it,
    /// in one bulk operation.
    pub async fn delete(&self, comment_id: Uuid, requester: AccountRef) -> Result<u64> {
        self.require_owned(comment_id, requester).await?;
        self.comments.delete_with_replies(comment_id).await
    }

    async fn require_owned(&self, comment_id: Uuid, requester: AccountRef) -> Result<Comment> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;
        if comment.author != requester {
            return Err(DomainError::Forbidden(
                "only the author may modify this comment".into(),
            ));
        }
        Ok(comment)
    }
}

fn require_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(DomainError::Validation(
            "comment body must not be blank".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{AccountKind, MockCommentRepo, MockContentRepo};

    fn someone() -> AccountRef {
        AccountRef {
            kind: AccountKind::Traveler,
            id: Uuid::now_v7(),
        }
    }

    fn parent_comment(author: AccountRef) -> Comment {
        Comment {
            id: Uuid::now_v7(),
            content_id: Uuid::now_v7(),
            author,
            parent_id: None,
            to_user: None,
            body: "loved this route".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn reply_defaults_to_user_to_parent_author() {
        let parent_author = someone();
        let parent = parent_comment(parent_author);
        let parent_id = parent.id;
        let content_id = parent.content_id;

        let mut comments = MockCommentRepo::new();
        comments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(parent.clone())));
        comments
            .expect_insert()
            .withf(move |comment| {
                comment.parent_id == Some(parent_id)
                    && comment.content_id == content_id
                    && comment.to_user == Some(parent_author)
            })
            .times(1)
            .returning(|_| Ok(()));

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockContentRepo::new()));
        svc.reply(parent_id, someone(), "same!", None).await.unwrap();
    }

    #[tokio::test]
    async fn explicit_to_user_wins_over_the_default() {
        let parent = parent_comment(someone());
        let parent_id = parent.id;
        let addressee = someone();

        let mut comments = MockCommentRepo::new();
        comments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(parent.clone())));
        comments
            .expect_insert()
            .withf(move |comment| comment.to_user == Some(addressee))
            .times(1)
            .returning(|_| Ok(()));

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockContentRepo::new()));
        svc.reply(parent_id, someone(), "@you", Some(addressee))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reply_to_missing_parent_is_not_found() {
        let mut comments = MockCommentRepo::new();
        comments.expect_find_by_id().returning(|_| Ok(None));
        comments.expect_insert().never();

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockContentRepo::new()));
        let err = svc
            .reply(Uuid::now_v7(), someone(), "hello?", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn blank_body_is_rejected_before_any_lookup() {
        let mut comments = MockCommentRepo::new();
        comments.expect_find_by_id().never();

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockContentRepo::new()));
        let err = svc
            .reply(Uuid::now_v7(), someone(), "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_cascades_through_the_repo() {
        let author = someone();
        let comment = parent_comment(author);
        let id = comment.id;

        let mut comments = MockCommentRepo::new();
        comments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(comment.clone())));
        comments
            .expect_delete_with_replies()
            .times(1)
            .returning(|_| Ok(3));

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockContentRepo::new()));
        assert_eq!(svc.delete(id, author).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn delete_by_non_author_is_forbidden() {
        let comment = parent_comment(someone());
        let id = comment.id;

        let mut comments = MockCommentRepo::new();
        comments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(comment.clone())));
        comments.expect_delete_with_replies().never();

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockContentRepo::new()));
        let err = svc.delete(id, someone()).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn threads_attach_flat_reply_lists() {
        let content_id = Uuid::now_v7();
        let top = parent_comment(someone());
        let top_id = top.id;
        let reply = Comment {
            parent_id: Some(top_id),
            ..parent_comment(someone())
        };

        let mut comments = MockCommentRepo::new();
        let tops = vec![top];
        comments
            .expect_list_top_level()
            .returning(move |_| Ok(tops.clone()));
        let replies = vec![reply];
        comments
            .expect_list_replies()
            .returning(move |_| Ok(replies.clone()));

        let svc = CommentService::new(Arc::new(comments), Arc::new(MockContentRepo::new()));
        let threads = svc.list_for_content(content_id).await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].replies.len(), 1);
        assert_eq!(threads[0].replies[0].parent_id, Some(top_id));
    }
}
