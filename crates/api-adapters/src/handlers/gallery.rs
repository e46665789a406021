//! Gallery endpoint: every hosted image across all content records.

use axum::extract::State;
use axum::response::Response;

use crate::envelope::{self, ApiResult};
use crate::AppState;

pub async fn browse(State(state): State<AppState>) -> ApiResult<Response> {
    let items = state.gallery.browse().await?;
    Ok(envelope::ok("listed", items))
}
