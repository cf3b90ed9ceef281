// src/ingest/providers/search.rs
use anyhow::{Context, Result};
use async_trait::async_trait;

use super::feed_rss::parse_feed;
use super::PageSource;
use crate::ingest::types::SourceAdapter;
use crate::item::NewsItem;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://news.google.com/rss/search";

/// News-search adapter. Queries an endpoint that answers with RSS (Google News
/// style `?q=`), so the search engine does the topic matching.
pub struct SearchAdapter {
    endpoint: String,
    /// Recency window appended as `when:<period>` (e.g. "1d", "7d").
    time_period: Option<String>,
    language: String,
    pages: PageSource,
}

impl SearchAdapter {
    pub fn new(endpoint: String, time_period: Option<String>, pages: PageSource) -> Self {
        Self {
            endpoint,
            time_period,
            language: "en".to_string(),
            pages,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Full query URL for `topic`.
    pub fn query_url(&self, topic: &str) -> Result<String> {
        let q = match self.time_period.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => format!("{} news when:{p}", topic.trim()),
            None => format!("{} news", topic.trim()),
        };
        let url = url::Url::parse_with_params(
            &self.endpoint,
            &[("q", q.as_str()), ("hl", self.language.as_str())],
        )
        .with_context(|| format!("invalid search endpoint {}", self.endpoint))?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl SourceAdapter for SearchAdapter {
    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let url = self.query_url(topic)?;
        tracing::info!(target: "ingest", %url, "search query");

        let xml = self.pages.get_text(&url).await?;
        let parsed = parse_feed(&xml).context("parsing search results")?;

        let out: Vec<NewsItem> = parsed
            .items
            .into_iter()
            .filter_map(|it| it.into_news_item("Search"))
            .take(max_results)
            .collect();
        Ok(out)
    }

    fn name(&self) -> &str {
        "search"
    }
}
