//! Direct-message endpoints. The sender's role comes from the session
//! token, not the request body, so a caller can never spoof the tag.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::envelope::{self, ApiResult};
use crate::extract::CurrentAccount;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub message: String,
}

pub async fn send(
    State(state): State<AppState>,
    Path(receiver_id): Path<Uuid>,
    account: CurrentAccount,
    Json(request): Json<SendMessageBody>,
) -> ApiResult<Response> {
    let message = state
        .chat
        .send(account.as_ref(), receiver_id, &request.message)
        .await?;
    Ok(envelope::created("message sent", message))
}

pub async fn conversations(
    State(state): State<AppState>,
    account: CurrentAccount,
) -> ApiResult<Response> {
    let summaries = state.chat.conversations(account.0.id).await?;
    Ok(envelope::ok("listed", summaries))
}

pub async fn messages(
    State(state): State<AppState>,
    Path(partner_id): Path<Uuid>,
    account: CurrentAccount,
) -> ApiResult<Response> {
    let transcript = state.chat.messages_with(account.0.id, partner_id).await?;
    Ok(envelope::ok("listed", transcript))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    account: CurrentAccount,
) -> ApiResult<Response> {
    state.chat.delete(id, account.as_ref()).await?;
    Ok(envelope::ok_message("message deleted"))
}
