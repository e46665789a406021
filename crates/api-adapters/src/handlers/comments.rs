//! Comment endpoints: two-level threads under a content record.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use domains::AccountRef;

use crate::envelope::{self, ApiResult};
use crate::extract::CurrentAccount;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub body: String,
}

pub async fn add(
    State(state): State<AppState>,
    Path(content_id): Path<Uuid>,
    account: CurrentAccount,
    Json(request): Json<CommentBody>,
) -> ApiResult<Response> {
    let comment = state
        .comments
        .add_top_level(content_id, account.as_ref(), &request.body)
        .await?;
    Ok(envelope::created("comment added", comment))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBody {
    pub body: String,
    /// Explicit addressee; defaults to the parent comment's author.
    #[serde(default)]
    pub to_user: Option<AccountRef>,
}

pub async fn reply(
    State(state): State<AppState>,
    Path(parent_id): Path<Uuid>,
    account: CurrentAccount,
    Json(request): Json<ReplyBody>,
) -> ApiResult<Response> {
    let comment = state
        .comments
        .reply(parent_id, account.as_ref(), &request.body, request.to_user)
        .await?;
    Ok(envelope::created("reply added", comment))
}

pub async fn list(
    State(state): State<AppState>,
    Path(content_id): Path<Uuid>,
) -> ApiResult<Response> {
    let threads = state.comments.list_for_content(content_id).await?;
    Ok(envelope::ok("listed", threads))
}

pub async fn update(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    account: CurrentAccount,
    Json(request): Json<CommentBody>,
) -> ApiResult<Response> {
    state
        .comments
        .update(comment_id, account.as_ref(), &request.body)
        .await?;
    Ok(envelope::ok_message("comment updated"))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    account: CurrentAccount,
) -> ApiResult<Response> {
    let removed = state.comments.delete(comment_id, account.as_ref()).await?;
    Ok(envelope::ok("comment deleted", removed))
}
