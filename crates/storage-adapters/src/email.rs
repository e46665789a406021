//! # Transactional email
//!
//! `Mailer` over the email provider's HTTP API. Plain-text bodies only;
//! the OTP emails have nothing to mark up.

use async_trait::async_trait;
use serde::Serialize;

use domains::{DomainError, Mailer, Result};

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

pub struct HttpMailer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from_address: String,
}

impl HttpMailer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        from_address: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from_address,
                to,
                subject,
                text: body,
            })
            .send()
            .await
            .map_err(|err| DomainError::Internal(format!("email provider error: {err}")))?;

        if !response.status().is_success() {
            return Err(DomainError::Internal(format!(
                "email provider rejected send: {}",
                response.status()
            )));
        }
        tracing::debug!(%to, %subject, "email dispatched");
        Ok(())
    }
}
