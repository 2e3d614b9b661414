//! Runtime configuration.
//!
//! Defaults point at the PMDA partial-change approval listing the service
//! was built for. Every value can be overridden through a `YAKULEX_*`
//! environment variable; unset variables keep their defaults, malformed
//! values fail startup loudly.

use std::env;
use std::time::Duration;

use url::Url;

use yakulex_common::http::{HttpConfig, RetryPolicy};

pub const PMDA_LISTING_URL: &str =
    "https://www.pmda.go.jp/review-services/drug-reviews/review-information/p-drugs/0028.html";
pub const PMDA_BASE_URL: &str = "https://www.pmda.go.jp";

/// "Covered indications" heading in PMDA review documents.
pub const START_KEYWORD: &str = "対象となる効能又は効果";
/// "Covered dosage and administration" heading, the section that follows.
pub const END_KEYWORD: &str = "対象となる用法及び用量";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Listing page the structural match runs against.
    pub listing_url: Url,
    /// Base address document hyperlinks are resolved against.
    pub base_url: Url,
    /// Anchor keyword opening the excerpt.
    pub start_keyword: String,
    /// Anchor keyword closing the excerpt.
    pub end_keyword: String,
    /// Window, in characters, mined after the start keyword when the
    /// closing anchor is missing.
    pub fallback_window: usize,
    /// Incomplete jobs older than this poll as expired.
    pub extraction_deadline: Duration,
    /// Records older than this are evicted outright.
    pub job_ttl: Duration,
    pub http: HttpConfig,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            listing_url: Url::parse(PMDA_LISTING_URL).expect("default listing URL is valid"),
            base_url: Url::parse(PMDA_BASE_URL).expect("default base URL is valid"),
            start_keyword: START_KEYWORD.to_string(),
            end_keyword: END_KEYWORD.to_string(),
            fallback_window: 150,
            extraction_deadline: Duration::from_secs(60),
            job_ttl: Duration::from_secs(3600),
            http: HttpConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = Self::default();

        if let Ok(v) = env::var("YAKULEX_LISTING_URL") {
            cfg.listing_url = Url::parse(&v)?;
        }
        if let Ok(v) = env::var("YAKULEX_BASE_URL") {
            cfg.base_url = Url::parse(&v)?;
        }
        if let Ok(v) = env::var("YAKULEX_START_KEYWORD") {
            cfg.start_keyword = v;
        }
        if let Ok(v) = env::var("YAKULEX_END_KEYWORD") {
            cfg.end_keyword = v;
        }
        if let Ok(v) = env::var("YAKULEX_FALLBACK_WINDOW") {
            cfg.fallback_window = v.parse()?;
        }
        if let Ok(v) = env::var("YAKULEX_EXTRACTION_DEADLINE_SECS") {
            cfg.extraction_deadline = Duration::from_secs(v.parse()?);
        }
        if let Ok(v) = env::var("YAKULEX_JOB_TTL_SECS") {
            cfg.job_ttl = Duration::from_secs(v.parse()?);
        }
        if let Ok(v) = env::var("YAKULEX_HTTP_TIMEOUT_SECS") {
            cfg.http.timeout = Duration::from_secs(v.parse()?);
        }
        if let Ok(v) = env::var("YAKULEX_MAX_RETRIES") {
            cfg.retry.max_retries = v.parse()?;
        }
        if let Ok(v) = env::var("YAKULEX_RETRY_DELAY_MS") {
            cfg.retry.delay = Duration::from_millis(v.parse()?);
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_pmda_listing() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.base_url.as_str(), "https://www.pmda.go.jp/");
        assert_eq!(cfg.fallback_window, 150);
        assert_eq!(cfg.retry.max_retries, 3);
    }
}
