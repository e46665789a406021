//! Request handlers, grouped the way the routers mount them.

pub mod auth;
pub mod chat;
pub mod comments;
pub mod content;
pub mod gallery;
