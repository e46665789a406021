//! # Remote media host
//!
//! `MediaHost` over a Cloudinary-style REST surface: multipart upload
//! returning `{secure_url, public_id}`, deletion by public id. Every call
//! is attempted exactly once; retry policy belongs to the caller, and
//! the content workflow deliberately has none.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use domains::{DomainError, MediaAsset, MediaHost, NewUpload, Result};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

pub struct RemoteMediaHost {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    folder: String,
}

impl RemoteMediaHost {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            folder: folder.into(),
        }
    }
}

#[async_trait]
impl MediaHost for RemoteMediaHost {
    async fn upload(&self, file: &NewUpload) -> Result<MediaAsset> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type.as_ref())
            .map_err(|err| DomainError::Internal(format!("bad upload content type: {err}")))?;
        let form = Form::new()
            .text("folder", self.folder.clone())
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(http_err)?;

        if !response.status().is_success() {
            return Err(DomainError::Internal(format!(
                "media host rejected upload: {}",
                response.status()
            )));
        }

        let uploaded: UploadResponse = response.json().await.map_err(http_err)?;
        tracing::debug!(public_id = %uploaded.public_id, "media uploaded");
        Ok(MediaAsset {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/destroy", self.base_url))
            .bearer_auth(&self.api_key)
            .form(&[("public_id", public_id)])
            .send()
            .await
            .map_err(http_err)?;

        if !response.status().is_success() {
            return Err(DomainError::Internal(format!(
                "media host rejected delete of {public_id}: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn http_err(err: reqwest::Error) -> DomainError {
    DomainError::Internal(format!("media host error: {err}"))
}
