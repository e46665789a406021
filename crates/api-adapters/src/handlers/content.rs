//! Blog/trip/package endpoints. Create and update are multipart: the
//! structured fields arrive as text parts, the images (at most five) as
//! file parts named `images`, and on update the URLs to keep as repeated
//! `keptImages` parts.

use axum::extract::{Multipart, Path, State};
use axum::response::Response;
use axum::Extension;
use uuid::Uuid;

use domains::{ContentKind, DomainError, NewUpload};
use services::ContentMeta;

use crate::envelope::{self, ApiError, ApiResult};
use crate::extract::CurrentAccount;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    account: CurrentAccount,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form = read_content_form(multipart).await?;
    let record = state
        .content
        .create(kind, account.as_ref(), form.meta, form.files)
        .await?;
    Ok(envelope::created(
        format!("{} created", kind.as_str()),
        record,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    account: CurrentAccount,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form = read_content_form(multipart).await?;
    let record = state
        .content
        .update(id, account.as_ref(), form.meta, form.kept_urls, form.files)
        .await?;
    Ok(envelope::ok("updated", record))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    account: CurrentAccount,
) -> ApiResult<Response> {
    state.content.delete(id, account.as_ref()).await?;
    Ok(envelope::ok_message("deleted"))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Response> {
    let record = state.content.get(id).await?;
    Ok(envelope::ok("found", record))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
) -> ApiResult<Response> {
    let records = state.content.list(kind).await?;
    Ok(envelope::ok("listed", records))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(kind): Extension<ContentKind>,
    account: CurrentAccount,
) -> ApiResult<Response> {
    let records = state.content.list_by_owner(kind, account.0.id).await?;
    Ok(envelope::ok("listed", records))
}

struct ContentForm {
    meta: ContentMeta,
    kept_urls: Vec<String>,
    files: Vec<NewUpload>,
}

/// Walks the multipart stream once, splitting text fields into the
/// metadata payload and buffering file parts for the upload step.
async fn read_content_form(mut multipart: Multipart) -> ApiResult<ContentForm> {
    let mut meta = ContentMeta::default();
    let mut kept_urls = Vec::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => meta.title = field.text().await.map_err(bad_multipart)?,
            "body" => meta.body = field.text().await.map_err(bad_multipart)?,
            "location" => {
                let text = field.text().await.map_err(bad_multipart)?;
                meta.location = (!text.trim().is_empty()).then(|| text.trim().to_string());
            }
            "tags" => {
                meta.tags = field
                    .text()
                    .await
                    .map_err(bad_multipart)?
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "cost" => {
                let text = field.text().await.map_err(bad_multipart)?;
                meta.cost = Some(text.trim().parse().map_err(|_| {
                    ApiError(DomainError::Validation(format!("cost is not a number: {text}")))
                })?);
            }
            "durationDays" => {
                let text = field.text().await.map_err(bad_multipart)?;
                meta.duration_days = Some(text.trim().parse().map_err(|_| {
                    ApiError(DomainError::Validation(format!(
                        "durationDays is not a whole number: {text}"
                    )))
                })?);
            }
            "keptImages" => kept_urls.push(field.text().await.map_err(bad_multipart)?),
            "images" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field
                    .content_type()
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream());
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                files.push(NewUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            // Unknown parts are ignored so older clients keep working.
            _ => {}
        }
    }

    Ok(ContentForm {
        meta,
        kept_urls,
        files,
    })
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError(DomainError::Validation(format!("malformed multipart body: {err}")))
}
