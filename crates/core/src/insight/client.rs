use crate::config::Settings;
use crate::insight::error::InsightError;
use crate::insight::request::InsightRequest;
use crate::insight::transport::{HttpInsightTransport, InsightTransport};
use crate::insight::Intent;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Remote,
    Fallback,
}

/// Why the remote answer was not used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightFailure {
    pub stage: &'static str,
    pub detail: String,
}

impl InsightFailure {
    fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<InsightError>() {
            Some(e) => Self {
                stage: e.stage,
                detail: e.detail.clone(),
            },
            None => Self {
                stage: "transport",
                detail: format!("{err:#}"),
            },
        }
    }
}

/// Always renderable: `insight` is either the validated remote answer or a
/// fallback built from the request metrics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightOutcome<T> {
    pub intent: Intent,
    pub insight: T,
    pub source: InsightSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<InsightFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub request_id: Uuid,
}

impl<T> InsightOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        self.source == InsightSource::Fallback
    }

    /// Retryable error text to show next to the content. Only intents that
    /// surface errors ever carry one.
    pub fn visible_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Clone)]
pub struct InsightClient {
    transport: Arc<dyn InsightTransport>,
}

impl InsightClient {
    pub fn new(transport: Arc<dyn InsightTransport>) -> Self {
        Self { transport }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let transport = HttpInsightTransport::from_settings(settings)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Never fails: transport errors, non-2xx statuses and malformed bodies
    /// all resolve to the payload's fallback. The failure is logged and kept
    /// on the outcome.
    pub async fn generate<P: InsightRequest>(&self, payload: &P) -> InsightOutcome<P::Output> {
        let intent = P::INTENT;
        let request_id = Uuid::new_v4();

        match self.call(payload, request_id).await {
            Ok(insight) => {
                tracing::info!(%intent, %request_id, "insight generated");
                InsightOutcome {
                    intent,
                    insight,
                    source: InsightSource::Remote,
                    failure: None,
                    error: None,
                    request_id,
                }
            }
            Err(err) => {
                let failure = InsightFailure::from_error(&err);
                tracing::warn!(
                    %intent,
                    %request_id,
                    stage = failure.stage,
                    error = %format!("{err:#}"),
                    "insight unavailable; using local fallback"
                );
                let error = intent
                    .surfaces_errors()
                    .then(|| "Failed to generate insights. Please try again.".to_string());
                InsightOutcome {
                    intent,
                    insight: payload.fallback(),
                    source: InsightSource::Fallback,
                    failure: Some(failure),
                    error,
                    request_id,
                }
            }
        }
    }

    async fn call<P: InsightRequest>(&self, payload: &P, request_id: Uuid) -> anyhow::Result<P::Output> {
        let intent = P::INTENT;
        let body = serde_json::to_value(payload).map_err(|e| InsightError {
            intent: Some(intent),
            stage: "encode",
            detail: e.to_string(),
            raw_output: None,
        })?;

        let raw = self
            .transport
            .post(intent.path(), request_id, &body)
            .await
            .map_err(|e| match e.downcast::<InsightError>() {
                Ok(mut diag) => {
                    diag.intent = Some(intent);
                    anyhow::Error::new(diag)
                }
                Err(other) => anyhow::Error::new(InsightError {
                    intent: Some(intent),
                    stage: "transport",
                    detail: format!("{other:#}"),
                    raw_output: None,
                }),
            })?;

        payload.normalize(&raw).map_err(|e| {
            InsightError {
                intent: Some(intent),
                stage: "parse",
                detail: format!("{e:#}"),
                raw_output: Some(raw.clone()),
            }
            .into()
        })
    }

    pub async fn health(&self) -> bool {
        match self.transport.health().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "insight service health check failed");
                false
            }
        }
    }
}
