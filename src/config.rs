use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use reqwest::Url;
use serde::Deserialize;

use crate::error::SearchError;
use crate::query::Media;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Full URL of the search resource, query string excluded.
    pub search_endpoint: String,
    /// Value of the `limit` parameter; the API caps a single call at 200.
    pub result_limit: u32,
    /// Storefront region sent as `country`.
    pub country: String,
    /// Whole-request timeout. Absent means the transport default.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    /// Maximum number of artwork downloads in flight at once.
    pub max_concurrent_fetches: usize,
    /// Image shown in every slot before the first successful search.
    pub placeholder_path: Option<PathBuf>,
    /// Prefill for the query field.
    pub default_term: String,
    /// Initial selection of the media selector.
    pub default_media: Media,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.endpoint_url().context("invalid search-endpoint")?;
        ensure!(
            (1..=200).contains(&self.result_limit),
            "result-limit must be between 1 and 200"
        );
        ensure!(
            self.country.len() == 2 && self.country.chars().all(|c| c.is_ascii_alphabetic()),
            "country must be a two-letter region code"
        );
        ensure!(
            self.max_concurrent_fetches > 0,
            "max-concurrent-fetches must be greater than zero"
        );
        if let Some(timeout) = self.request_timeout {
            ensure!(!timeout.is_zero(), "request-timeout must be positive");
        }
        Ok(self)
    }

    pub fn endpoint_url(&self) -> Result<Url, SearchError> {
        let url = Url::parse(&self.search_endpoint)
            .map_err(|err| SearchError::Endpoint(format!("{:?}: {err}", self.search_endpoint)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SearchError::Endpoint(format!(
                "{:?}: scheme must be http or https",
                self.search_endpoint
            )));
        }
        Ok(url)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            search_endpoint: "https://itunes.apple.com/search".to_string(),
            result_limit: 200,
            country: "US".to_string(),
            request_timeout: None,
            max_concurrent_fetches: 8,
            placeholder_path: None,
            default_term: "jack johnson".to_string(),
            default_media: Media::Music,
        }
    }
}
