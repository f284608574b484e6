use crate::{Config, error::{ConfigError, ProviderError}, provider::gemini::GeminiProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod gemini;

/// A generative text endpoint: prompt in, free-form text out.
#[async_trait]
pub trait ReportProvider: Send + Sync + Debug {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Construct the report provider from config.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn ReportProvider>, ConfigError> {
    let api_key = config.require_api_key()?;

    let provider = GeminiProvider::new(
        api_key.to_owned(),
        config.model().to_owned(),
        config.base_url().to_owned(),
    )?;

    Ok(Box::new(provider))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".to_string());
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn provider_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundaries() {
        let body = "é".repeat(300);
        let short = truncate_body(&body);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
