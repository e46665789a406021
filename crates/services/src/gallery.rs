//! # Gallery
//!
//! Single-pass aggregation of every hosted image across all content
//! records, newest records first.

use std::sync::Arc;

use domains::{ContentRepo, GalleryItem, Result};

pub struct GalleryService {
    records: Arc<dyn ContentRepo>,
}

impl GalleryService {
    pub fn new(records: Arc<dyn ContentRepo>) -> Self {
        Self { records }
    }

    pub async fn browse(&self) -> Result<Vec<GalleryItem>> {
        let records = self.records.list_all().await?;
        let items = records
            .into_iter()
            .flat_map(|record| {
                let id = record.id;
                let kind = record.kind;
                let title = record.title;
                record.images.into_iter().map(move |asset| GalleryItem {
                    url: asset.url,
                    content_id: id,
                    kind,
                    title: title.clone(),
                })
            })
            .collect();
        Ok(items)
    }
}
