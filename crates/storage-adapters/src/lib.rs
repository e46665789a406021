//! # storage-adapters
//!
//! Outbound adapters: MongoDB repositories for the four collections, the
//! remote media-host client, and the transactional-email client. Each
//! implements the matching port trait from `domains`.

pub mod email;
pub mod media;
pub mod mongo;

pub use email::HttpMailer;
pub use media::RemoteMediaHost;
pub use mongo::{
    connect, MongoAccountRepo, MongoChatRepo, MongoCommentRepo, MongoContentRepo,
};
