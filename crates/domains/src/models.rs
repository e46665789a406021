//! # Domain Models
//!
//! These structs represent the core entities of Wayfarer.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two account variants. Travelers book and blog; guides offer trips
/// and packages. Both share the same credential/OTP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Traveler,
    Guide,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Traveler => "traveler",
            AccountKind::Guide => "guide",
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "traveler" | "user" => Ok(AccountKind::Traveler),
            "guide" => Ok(AccountKind::Guide),
            other => Err(format!("unknown account kind: {other}")),
        }
    }
}

/// A pending one-time code. Hash and expiry always travel together:
/// there is no state where one is set and the other cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpState {
    /// SHA-256 hex digest of the 6-digit plaintext code.
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// A traveler or guide account. One shape for both kinds; guides carry
/// the two optional profile fields at the bottom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub kind: AccountKind,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub otp: Option<OtpState>,
    pub speciality: Option<String>,
    pub rate_per_day: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Explicit tagged reference to an account: the caller always says which
/// collection the id lives in instead of relying on dynamic lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub kind: AccountKind,
    pub id: Uuid,
}

/// The three content flavors sharing the upload-then-persist shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Blog,
    Trip,
    Package,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Blog => "blog",
            ContentKind::Trip => "trip",
            ContentKind::Package => "package",
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "blog" => Ok(ContentKind::Blog),
            "trip" => Ok(ContentKind::Trip),
            "package" => Ok(ContentKind::Package),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

/// One hosted image. The host's public identifier is captured at upload
/// time so deletion never has to re-derive it from the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub url: String,
    pub public_id: String,
}

/// A blog, trip, or package document. `images` is non-empty after create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: Uuid,
    pub kind: ContentKind,
    pub owner: AccountRef,
    pub title: String,
    pub body: String,
    pub location: Option<String>,
    pub images: Vec<MediaAsset>,
    pub tags: Vec<String>,
    /// Required for packages, >= 0.
    pub cost: Option<f64>,
    /// Required for trips and packages, >= 1.
    pub duration_days: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A discussion entry under a content record. A non-null `parent_id`
/// makes this a reply; replies never have replies of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content_id: Uuid,
    pub author: AccountRef,
    pub parent_id: Option<Uuid>,
    /// Which participant the reply addresses; defaults to the parent's author.
    pub to_user: Option<AccountRef>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A top-level comment together with its flat reply list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// A persisted direct message. Immutable once created except for deletion
/// by the sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: String,
    pub sender: AccountRef,
    pub receiver: AccountRef,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Display profile of the other party in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub partner: AccountRef,
    pub partner_name: String,
    pub partner_email: String,
}

/// One gallery entry: an image URL plus where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItem {
    pub url: String,
    pub content_id: Uuid,
    pub kind: ContentKind,
    pub title: String,
}

/// A staged file blob on its way to the media host.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUpload {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: bytes::Bytes,
}

/// What a session token asserts about its bearer. Expiry is handled by
/// the token adapter, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub account_id: Uuid,
    pub email: String,
    pub kind: AccountKind,
}

/// Deterministic two-party conversation identifier: both participant ids
/// sorted lexicographically and joined, so either side derives the same id.
pub fn conversation_id(a: Uuid, b: Uuid) -> String {
    let (lo, hi) = if a.to_string() <= b.to_string() {
        (a, b)
    } else {
        (b, a)
    };
    format!("{lo}_{hi}")
}
