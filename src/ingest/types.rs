// src/ingest/types.rs
use anyhow::Result;
use serde::Serialize;

use crate::item::NewsItem;

/// One origin of candidate items (feed, search page, website).
///
/// Implementations report network/parse failures as `Err`; the aggregator turns
/// that into zero items plus a recorded error, so a failing adapter never aborts
/// the batch.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &str;
}

/// Adapter failure captured during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterError {
    pub adapter: String,
    pub message: String,
}

/// Result of one aggregation run.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub items: Vec<NewsItem>,
    /// Candidates collected before deduplication.
    pub candidates: usize,
    pub duplicates: usize,
    pub errors: Vec<AdapterError>,
}
