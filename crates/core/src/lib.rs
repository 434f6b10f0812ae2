pub mod aggregate;
pub mod budget;
pub mod domain;
pub mod insight;
pub mod ledger;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_INSIGHT_BASE_URL: &str = "http://localhost:3000";
    const DEFAULT_INSIGHT_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub insight_base_url: Option<String>,
        pub insight_timeout_secs: u64,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let insight_timeout_secs = match std::env::var("INSIGHT_TIMEOUT_SECS") {
                Ok(raw) => raw
                    .parse::<u64>()
                    .with_context(|| format!("INSIGHT_TIMEOUT_SECS is not a number: {raw}"))?,
                Err(_) => DEFAULT_INSIGHT_TIMEOUT_SECS,
            };

            Ok(Self {
                insight_base_url: std::env::var("INSIGHT_BASE_URL").ok(),
                insight_timeout_secs,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        /// Base URL of the insight service, falling back to the local
        /// development server.
        pub fn insight_base_url(&self) -> &str {
            self.insight_base_url
                .as_deref()
                .unwrap_or(DEFAULT_INSIGHT_BASE_URL)
        }

        pub fn require_insight_base_url(&self) -> anyhow::Result<&str> {
            self.insight_base_url
                .as_deref()
                .context("INSIGHT_BASE_URL is required")
        }
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                insight_base_url: None,
                insight_timeout_secs: DEFAULT_INSIGHT_TIMEOUT_SECS,
                sentry_dsn: None,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn base_url_defaults_only_for_the_lenient_accessor() {
            let settings = Settings::default();
            assert_eq!(settings.insight_base_url(), "http://localhost:3000");
            let err = settings.require_insight_base_url().unwrap_err();
            assert_eq!(err.to_string(), "INSIGHT_BASE_URL is required");

            let settings = Settings {
                insight_base_url: Some("http://insights.internal:9000".into()),
                ..Settings::default()
            };
            assert_eq!(
                settings.require_insight_base_url().unwrap(),
                "http://insights.internal:9000"
            );
        }
    }
}
