//! # services
//!
//! Business logic for Wayfarer, written against the port traits in
//! `domains`. Each service owns `Arc`s to the collaborators it needs and
//! nothing else; wiring happens in the binary.

pub mod auth;
pub mod chat;
pub mod comments;
pub mod content;
pub mod gallery;
pub mod otp;

pub use auth::AuthService;
pub use chat::ChatService;
pub use comments::CommentService;
pub use content::{ContentMeta, ContentService, MAX_IMAGES_PER_RECORD};
pub use gallery::GalleryService;
pub use otp::{OtpLifecycle, OtpPurpose};
