//! Search API client.
//!
//! Builds the `GET <endpoint>?term=..&media=..&limit=..&country=..` request,
//! checks the status, and maps the `results[].artworkUrl100` fields into an
//! ordered, de-duplicated list of [`ArtworkLocator`]s.

use std::collections::HashSet;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::config::Configuration;
use crate::error::SearchError;
use crate::query::{ArtworkLocator, SearchQuery};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<Option<SearchResult>>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "artworkUrl100", default)]
    artwork_url_100: Option<String>,
}

/// Stateless apart from the pooled HTTP client; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct ArtworkClient {
    http: reqwest::Client,
    endpoint: Url,
    limit: u32,
    country: String,
}

impl ArtworkClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        limit: u32,
        country: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint,
            limit,
            country: country.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, cfg: &Configuration) -> Result<Self, SearchError> {
        Ok(Self::new(
            http,
            cfg.endpoint_url()?,
            cfg.result_limit,
            cfg.country.clone(),
        ))
    }

    /// Full request URL for `query`, with the term form-encoded.
    pub fn request_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("term", query.term())
            .append_pair("media", query.media().as_str())
            .append_pair("limit", &self.limit.to_string())
            .append_pair("country", &self.country);
        url
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ArtworkLocator>, SearchError> {
        let url = self.request_url(query);
        debug!(%url, "issuing search request");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        let body = response.text().await?;
        let locators = parse_locators(&body)?;
        debug!(
            term = query.term(),
            media = %query.media(),
            distinct = locators.len(),
            "search response parsed"
        );
        Ok(locators)
    }
}

/// Extracts distinct artwork locators in first-seen order. Results without an
/// `artworkUrl100` are skipped.
pub fn parse_locators(body: &str) -> Result<Vec<ArtworkLocator>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let mut seen = HashSet::new();
    let locators = response
        .results
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|result| result.artwork_url_100)
        .filter(|url| seen.insert(url.clone()))
        .map(ArtworkLocator::from)
        .collect();
    Ok(locators)
}
