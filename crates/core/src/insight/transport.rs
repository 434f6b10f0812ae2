use crate::config::Settings;
use crate::insight::error::InsightError;
use crate::insight::HEALTH_PATH;
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wire access to the insight service. Returns the raw body of a successful
/// call; interpreting it is the caller's job.
#[async_trait]
pub trait InsightTransport: Send + Sync {
    async fn post(&self, path: &str, request_id: Uuid, body: &serde_json::Value) -> anyhow::Result<String>;

    async fn health(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct HttpInsightTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInsightTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            settings.insight_base_url(),
            Duration::from_secs(settings.insight_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl InsightTransport for HttpInsightTransport {
    async fn post(&self, path: &str, request_id: Uuid, body: &serde_json::Value) -> anyhow::Result<String> {
        let res = self
            .http
            .post(self.url(path))
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(body)
            .send()
            .await
            .with_context(|| format!("insight request to {path} failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read insight response body")?;
        if !status.is_success() {
            return Err(InsightError::new("http", format!("status={status}"))
                .with_raw(text)
                .into());
        }
        Ok(text)
    }

    async fn health(&self) -> anyhow::Result<()> {
        let res = self
            .http
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .context("insight health check failed")?;
        let status = res.status();
        if !status.is_success() {
            return Err(InsightError::new("health", format!("status={status}")).into());
        }
        Ok(())
    }
}
