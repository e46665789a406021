//! # Content Workflow
//!
//! Orchestrates blogs, trips, and packages: validate the metadata first,
//! push the staged files to the media host, then persist the record. If
//! the persist step fails, every asset uploaded in that request is deleted
//! from the host, best-effort. Destructive deletion of images dropped by
//! an update happens only after the record write is confirmed, the same
//! policy as create, never before the write.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{
    AccountRef, ContentKind, ContentRecord, ContentRepo, DomainError, MediaAsset, MediaHost,
    NewUpload, Result,
};

/// A single request may carry at most this many images.
pub const MAX_IMAGES_PER_RECORD: usize = 5;

/// Structured (non-file) fields of a create/update request.
#[derive(Debug, Clone, Default)]
pub struct ContentMeta {
    pub title: String,
    pub body: String,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub cost: Option<f64>,
    pub duration_days: Option<i64>,
}

pub struct ContentService {
    records: Arc<dyn ContentRepo>,
    media: Arc<dyn MediaHost>,
}

impl ContentService {
    pub fn new(records: Arc<dyn ContentRepo>, media: Arc<dyn MediaHost>) -> Self {
        Self { records, media }
    }

    /// Create flow: validate → upload → persist (compensating on failure).
    pub async fn create(
        &self,
        kind: ContentKind,
        owner: AccountRef,
        meta: ContentMeta,
        files: Vec<NewUpload>,
    ) -> Result<ContentRecord> {
        // 1. Validation precedes every upload attempt.
        validate_meta(kind, &meta)?;
        validate_image_count(files.len())?;

        // 2. Upload sequentially; individual failures are tolerated as
        //    long as at least one file makes it.
        let assets = self.upload_all(&files).await;
        if assets.is_empty() {
            return Err(DomainError::UploadFailed(
                "no image could be uploaded".into(),
            ));
        }

        // 3. Persist; on failure, sweep everything uploaded this request.
        let now = Utc::now();
        let record = ContentRecord {
            id: Uuid::now_v7(),
            kind,
            owner,
            title: meta.title.trim().to_string(),
            body: meta.body.trim().to_string(),
            location: meta.location,
            images: assets.clone(),
            tags: meta.tags,
            cost: meta.cost.filter(|_| kind != ContentKind::Blog),
            duration_days: meta.duration_days.filter(|_| kind != ContentKind::Blog),
            created_at: now,
            updated_at: now,
        };
        if let Err(err) = self.records.insert(record.clone()).await {
            tracing::error!(%err, kind = kind.as_str(), "persist failed after upload; compensating");
            self.delete_media_best_effort(&assets).await;
            return Err(DomainError::PersistenceFailed(err.to_string()));
        }

        tracing::info!(id = %record.id, kind = kind.as_str(), images = record.images.len(), "content created");
        Ok(record)
    }

    /// Update flow. `kept_urls` names the pre-existing images the caller
    /// wants to keep; everything else on the old record is deleted from
    /// the host after (and only after) the write is confirmed.
    pub async fn update(
        &self,
        id: Uuid,
        requester: AccountRef,
        meta: ContentMeta,
        kept_urls: Vec<String>,
        new_files: Vec<NewUpload>,
    ) -> Result<ContentRecord> {
        let existing = self.require_owned(id, requester).await?;
        validate_meta(existing.kind, &meta)?;

        let kept: Vec<MediaAsset> = existing
            .images
            .iter()
            .filter(|asset| kept_urls.contains(&asset.url))
            .cloned()
            .collect();
        validate_image_count(kept.len() + new_files.len())?;

        let uploaded = self.upload_all(&new_files).await;
        let mut images = kept;
        images.extend(uploaded.iter().cloned());
        if images.is_empty() {
            return Err(DomainError::UploadFailed(
                "record would be left without any image".into(),
            ));
        }

        let updated = ContentRecord {
            title: meta.title.trim().to_string(),
            body: meta.body.trim().to_string(),
            location: meta.location,
            images: images.clone(),
            tags: meta.tags,
            cost: meta.cost.filter(|_| existing.kind != ContentKind::Blog),
            duration_days: meta
                .duration_days
                .filter(|_| existing.kind != ContentKind::Blog),
            updated_at: Utc::now(),
            ..existing.clone()
        };
        if let Err(err) = self.records.update(updated.clone()).await {
            tracing::error!(%err, id = %id, "update failed after upload; compensating new uploads");
            self.delete_media_best_effort(&uploaded).await;
            return Err(DomainError::PersistenceFailed(err.to_string()));
        }

        // The write is confirmed; now the dropped old images may go.
        let dropped: Vec<MediaAsset> = existing
            .images
            .into_iter()
            .filter(|asset| !images.contains(asset))
            .collect();
        self.delete_media_best_effort(&dropped).await;

        Ok(updated)
    }

    /// Deletes the record, then sweeps its media from the host.
    pub async fn delete(&self, id: Uuid, requester: AccountRef) -> Result<()> {
        let existing = self.require_owned(id, requester).await?;
        self.records.delete(id).await?;
        self.delete_media_best_effort(&existing.images).await;
        tracing::info!(id = %id, "content deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<ContentRecord> {
        self.records
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("content record", id))
    }

    pub async fn list(&self, kind: ContentKind) -> Result<Vec<ContentRecord>> {
        self.records.list(kind).await
    }

    pub async fn list_by_owner(
        &self,
        kind: ContentKind,
        owner: Uuid,
    ) -> Result<Vec<ContentRecord>> {
        self.records.list_by_owner(kind, owner).await
    }

    async fn require_owned(&self, id: Uuid, requester: AccountRef) -> Result<ContentRecord> {
        let record = self.get(id).await?;
        if record.owner != requester {
            return Err(DomainError::Forbidden(
                "only the owner may modify this record".into(),
            ));
        }
        Ok(record)
    }

    /// Sequential upload, one attempt per file, partial success tolerated.
    async fn upload_all(&self, files: &[NewUpload]) -> Vec<MediaAsset> {
        let mut assets = Vec::with_capacity(files.len());
        for file in files {
            match self.media.upload(file).await {
                Ok(asset) => assets.push(asset),
                Err(err) => {
                    tracing::warn!(%err, file = %file.file_name, "image upload failed; continuing");
                }
            }
        }
        assets
    }

    /// Best-effort sweep: delete failures are logged, never surfaced,
    /// because the primary operation's outcome is the one reported.
    async fn delete_media_best_effort(&self, assets: &[MediaAsset]) {
        for asset in assets {
            if let Err(err) = self.media.delete(&asset.public_id).await {
                tracing::warn!(public_id = %asset.public_id, %err, "media delete failed; asset orphaned");
            }
        }
    }
}

fn validate_meta(kind: ContentKind, meta: &ContentMeta) -> Result<()> {
    if meta.title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be blank".into()));
    }
    if meta.body.trim().is_empty() {
        return Err(DomainError::Validation("body must not be blank".into()));
    }
    match kind {
        ContentKind::Blog => {}
        ContentKind::Trip => {
            require_duration(meta)?;
            if let Some(cost) = meta.cost {
                require_non_negative(cost)?;
            }
        }
        ContentKind::Package => {
            let cost = meta
                .cost
                .ok_or_else(|| DomainError::Validation("package cost is required".into()))?;
            require_non_negative(cost)?;
            require_duration(meta)?;
        }
    }
    Ok(())
}

fn require_duration(meta: &ContentMeta) -> Result<()> {
    match meta.duration_days {
        Some(days) if days >= 1 => Ok(()),
        Some(_) => Err(DomainError::Validation(
            "duration must be at least 1 day".into(),
        )),
        None => Err(DomainError::Validation("duration is required".into())),
    }
}

fn require_non_negative(cost: f64) -> Result<()> {
    if cost < 0.0 {
        return Err(DomainError::Validation("cost must not be negative".into()));
    }
    Ok(())
}

fn validate_image_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(DomainError::Validation(
            "at least one image is required".into(),
        ));
    }
    if count > MAX_IMAGES_PER_RECORD {
        return Err(DomainError::Validation(format!(
            "at most {MAX_IMAGES_PER_RECORD} images are allowed"
        )));
    }
    Ok(())
}
