use crate::insight::Intent;
use std::fmt;

#[derive(Debug, Clone)]
pub struct InsightError {
    pub intent: Option<Intent>,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl InsightError {
    pub fn new(stage: &'static str, detail: impl Into<String>) -> Self {
        Self {
            intent: None,
            stage,
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw_output = Some(raw.into());
        self
    }
}

impl fmt::Display for InsightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.intent {
            Some(intent) => write!(
                f,
                "insight error (intent={intent}, stage={}): {}",
                self.stage, self.detail
            ),
            None => write!(f, "insight error (stage={}): {}", self.stage, self.detail),
        }
    }
}

impl std::error::Error for InsightError {}
