// src/ingest/config.rs
//! Source configuration and the single place where source kinds are mapped to
//! adapter implementations.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ingest::providers::search::DEFAULT_SEARCH_ENDPOINT;
use crate::ingest::providers::{FeedAdapter, PageSource, SearchAdapter, WebsiteAdapter};
use crate::ingest::types::SourceAdapter;

pub const DEFAULT_USER_AGENT: &str = "NewsBot/1.0 (+https://github.com/newsbot)";

/// Closed set of adapter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Feed,
    Search,
    Website,
}

/// One `[[sources]]` entry, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Feed {
        feeds: Vec<String>,
        #[serde(default = "default_max_age_days")]
        max_age_days: u32,
    },
    Search {
        #[serde(default = "default_search_endpoint")]
        endpoint: String,
        #[serde(default)]
        time_period: Option<String>,
        #[serde(default)]
        language: Option<String>,
    },
    Website {
        sites: Vec<String>,
    },
}

fn default_max_age_days() -> u32 {
    1
}

fn default_search_endpoint() -> String {
    DEFAULT_SEARCH_ENDPOINT.to_string()
}

impl SourceConfig {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Feed { .. } => SourceKind::Feed,
            Self::Search { .. } => SourceKind::Search,
            Self::Website { .. } => SourceKind::Website,
        }
    }

    /// Built-in source set used when no config lists any.
    pub fn default_set() -> Vec<SourceConfig> {
        vec![
            SourceConfig::Search {
                endpoint: default_search_endpoint(),
                time_period: Some("1d".to_string()),
                language: None,
            },
            SourceConfig::Website {
                sites: vec![
                    "https://www.bbc.com/news".to_string(),
                    "https://www.reuters.com".to_string(),
                ],
            },
            SourceConfig::Feed {
                feeds: vec![
                    "http://rss.cnn.com/rss/cnn_topstories.rss".to_string(),
                    "http://feeds.bbci.co.uk/news/rss.xml".to_string(),
                    "https://www.reddit.com/r/news/.rss".to_string(),
                ],
                max_age_days: 1,
            },
        ]
    }
}

/// Build adapters in configuration order. The order is the aggregation
/// tie-break order, so it is preserved exactly.
pub fn build_adapters(sources: &[SourceConfig], pages: &PageSource) -> Vec<Box<dyn SourceAdapter>> {
    sources
        .iter()
        .map(|cfg| -> Box<dyn SourceAdapter> {
            match cfg {
                SourceConfig::Feed {
                    feeds,
                    max_age_days,
                } => Box::new(FeedAdapter::new(feeds.clone(), *max_age_days, pages.clone())),
                SourceConfig::Search {
                    endpoint,
                    time_period,
                    language,
                } => {
                    let a = SearchAdapter::new(endpoint.clone(), time_period.clone(), pages.clone());
                    match language {
                        Some(l) => Box::new(a.with_language(l.clone())),
                        None => Box::new(a),
                    }
                }
                SourceConfig::Website { sites } => {
                    Box::new(WebsiteAdapter::new(sites.clone(), pages.clone()))
                }
            }
        })
        .collect()
}

/// Live HTTP adapters for `sources`.
pub fn build_http_adapters(
    sources: &[SourceConfig],
    user_agent: &str,
    timeout_secs: u64,
) -> Result<Vec<Box<dyn SourceAdapter>>> {
    let pages = PageSource::http(user_agent, timeout_secs)?;
    Ok(build_adapters(sources, &pages))
}
