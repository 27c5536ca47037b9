use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

use crate::types::{SlackUploadResponse, Window};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Slack did not acknowledge upload of {file}: {}", .error.as_deref().unwrap_or("unknown error"))]
    NotAcknowledged { file: String, error: Option<String> },
}

/// Chat destination for the rendered grids.
#[async_trait]
pub trait Publisher {
    async fn upload_file(&self, channel: &str, path: &Path, title: &str) -> Result<()>;
}

pub fn upload_title(project: &str, window: Window) -> String {
    format!("{} trailing {} uptime", project, window)
}

/// Slack expects channel names with their leading `#`.
pub fn channel_ref(channel: &str) -> String {
    if channel.starts_with('#') {
        channel.to_string()
    } else {
        format!("#{}", channel)
    }
}

pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl Publisher for SlackClient {
    async fn upload_file(&self, channel: &str, path: &Path, title: &str) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.png".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str("image/png")?;
        let form = Form::new()
            .text("channels", channel_ref(channel))
            .text("title", title.to_string())
            .part("file", part);

        let res = self
            .http
            .post(format!("{}/files.upload", self.base_url))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .context("Failed to send Slack upload request")?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            error!("Slack upload failed: {} - {}", status, body);
            return Err(anyhow!("Slack upload returned non-success status {}", status));
        }

        let ack: SlackUploadResponse = res
            .json()
            .await
            .context("Invalid Slack upload response")?;
        if !ack.ok {
            return Err(PublishError::NotAcknowledged {
                file: file_name,
                error: ack.error,
            }
            .into());
        }
        info!("Uploaded {} to {}", file_name, channel_ref(channel));
        Ok(())
    }
}
