//! # Core Traits (Ports)
//!
//! Every adapter implements one of these contracts. With the `testing`
//! feature enabled, mockall generates a `MockXxx` for each port so
//! services can be exercised without live collaborators.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Account, AccountKind, ChatMessage, Comment, ContentKind, ContentRecord, MediaAsset,
    NewUpload, OtpState, SessionClaims,
};

/// Persistence contract for the two account collections.
///
/// Every operation takes the `AccountKind` naming the collection; the
/// OTP lifecycle is thereby written once and parameterized over kind.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn insert(&self, account: Account) -> Result<()>;
    async fn find_by_email(&self, kind: AccountKind, email: &str) -> Result<Option<Account>>;
    async fn find_by_id(&self, kind: AccountKind, id: Uuid) -> Result<Option<Account>>;
    /// Resolves an id with no kind tag: tries travelers first, then guides.
    async fn resolve_any(&self, id: Uuid) -> Result<Option<Account>>;
    /// Overwrites any pending OTP state on the account.
    async fn set_otp(&self, kind: AccountKind, id: Uuid, otp: OtpState) -> Result<()>;
    /// Sets `is_verified = true` and clears the OTP fields in one document write.
    async fn mark_verified(&self, kind: AccountKind, id: Uuid) -> Result<()>;
    /// Replaces the password hash, sets `is_verified = true`, and clears
    /// the OTP fields in one document write.
    async fn reset_credentials(
        &self,
        kind: AccountKind,
        id: Uuid,
        password_hash: &str,
    ) -> Result<()>;
}

/// Persistence contract for blogs, trips, and packages.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn insert(&self, record: ContentRecord) -> Result<()>;
    /// Full-document replace keyed by `record.id`.
    async fn update(&self, record: ContentRecord) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentRecord>>;
    /// Newest first.
    async fn list(&self, kind: ContentKind) -> Result<Vec<ContentRecord>>;
    async fn list_by_owner(&self, kind: ContentKind, owner: Uuid) -> Result<Vec<ContentRecord>>;
    /// Every record of every kind, newest first, for gallery aggregation.
    async fn list_all(&self) -> Result<Vec<ContentRecord>>;
}

/// Persistence contract for the two-level comment threads.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn insert(&self, comment: Comment) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn update_body(&self, id: Uuid, body: &str) -> Result<()>;
    /// Removes the comment and every comment whose `parent_id` equals it,
    /// in one bulk operation. Returns the number of documents removed.
    async fn delete_with_replies(&self, id: Uuid) -> Result<u64>;
    /// Top-level comments (`parent_id = null`) for a record, newest first.
    async fn list_top_level(&self, content_id: Uuid) -> Result<Vec<Comment>>;
    async fn list_replies(&self, parent_id: Uuid) -> Result<Vec<Comment>>;
}

/// Persistence contract for direct messages.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChatRepo: Send + Sync {
    async fn insert(&self, message: ChatMessage) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChatMessage>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Oldest first, the order a conversation reads in.
    async fn list_conversation(&self, conversation_id: &str) -> Result<Vec<ChatMessage>>;
    /// Every message where the account is sender or receiver.
    async fn list_involving(&self, account_id: Uuid) -> Result<Vec<ChatMessage>>;
}

/// Remote media host contract. Each call is attempted exactly once;
/// retries and durability are the host's problem, not ours.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Pushes one staged file and returns its public URL + public id.
    async fn upload(&self, file: &NewUpload) -> Result<MediaAsset>;
    /// Deletes by the public id captured at upload time.
    async fn delete(&self, public_id: &str) -> Result<()>;
}

/// Transactional email contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Password hashing contract (argon2 in production).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, secret: &str) -> Result<String>;
    fn verify(&self, secret: &str, hash: &str) -> bool;
}

/// Session token contract (HMAC-signed JWT in production, 24 h expiry).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, claims: &SessionClaims) -> Result<String>;
    fn decode(&self, token: &str) -> Result<SessionClaims>;
}

/// Real-time fan-out contract. Fire-and-forget: delivery to offline
/// parties is skipped, never queued.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ChatNotifier: Send + Sync {
    fn message_created(&self, message: &ChatMessage);
    fn message_deleted(&self, conversation_id: &str, message_id: Uuid);
}
