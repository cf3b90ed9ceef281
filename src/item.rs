// src/item.rs
//! Canonical news item shared by every adapter and pipeline stage, plus the flat
//! JSON snapshots written between stages.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Compound sentiment plus token proportions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Normalized polarity in <-1.0, 1.0>.
    pub compound: f32,
    pub positive: f32,
    pub negative: f32,
    pub neutral: f32,
}

impl SentimentScore {
    pub fn neutral() -> Self {
        Self {
            compound: 0.0,
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
        }
    }
}

/// One discovered news story.
///
/// Adapters build it with [`NewsItem::new`] and the builder helpers; later stages
/// fill `summary`, `question`, `sentiment` and `processed` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    /// Identity key for deduplication.
    pub url: String,
    pub source: String,
    #[serde(default = "Utc::now")]
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub lead_image_url: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub sentiment: Option<SentimentScore>,
    #[serde(default)]
    pub processed: bool,
    /// Reference produced by the image stage (path or URL).
    #[serde(default)]
    pub rendered_image_path: Option<String>,
}

impl NewsItem {
    /// New candidate discovered "now"; everything the pipeline fills later is empty.
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            published_at: Utc::now(),
            body: String::new(),
            summary: String::new(),
            lead_image_url: None,
            question: String::new(),
            sentiment: None,
            processed: false,
            rendered_image_path: None,
        }
    }

    /// Set the publish time; `None` keeps the discovery time.
    pub fn published(mut self, ts: Option<DateTime<Utc>>) -> Self {
        if let Some(ts) = ts {
            self.published_at = ts;
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Empty strings are treated as "no image".
    pub fn with_lead_image(mut self, url: Option<String>) -> Self {
        self.lead_image_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Best text for sentiment scoring: body, else summary, else title.
    pub fn best_text(&self) -> &str {
        [&self.body, &self.summary, &self.title]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Flat, ordered list of items stamped with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    pub items: Vec<NewsItem>,
}

impl Snapshot {
    pub fn new(items: Vec<NewsItem>) -> Self {
        Self {
            saved_at: Utc::now(),
            items,
        }
    }
}

/// Write `items` as a pretty-printed snapshot, creating parent dirs as needed.
pub fn save_snapshot(path: &Path, items: &[NewsItem]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let snap = Snapshot::new(items.to_vec());
    let json = serde_json::to_string_pretty(&snap).context("serializing snapshot")?;
    fs::write(path, json).with_context(|| format!("writing snapshot {}", path.display()))?;
    tracing::info!(target: "snapshot", path = %path.display(), items = items.len(), "snapshot saved");
    Ok(())
}

/// Read a snapshot back. A missing file yields an empty snapshot.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        tracing::warn!(target: "snapshot", path = %path.display(), "snapshot file does not exist");
        return Ok(Snapshot::new(Vec::new()));
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snap: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    Ok(snap)
}

/// File-name friendly form of a topic ("climate change" → "climate_change").
pub fn topic_slug(topic: &str) -> String {
    let slug: String = topic
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if slug.is_empty() {
        "topic".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_item_has_explicit_defaults() {
        let it = NewsItem::new("Title", "http://x.com", "Source");
        assert!(it.summary.is_empty());
        assert!(it.question.is_empty());
        assert!(!it.processed);
        assert!(it.sentiment.is_none());
        assert!(it.lead_image_url.is_none());
    }

    #[test]
    fn best_text_priority() {
        let it = NewsItem::new("T", "u", "s");
        assert_eq!(it.best_text(), "T");
        let it = it.with_summary("S");
        assert_eq!(it.best_text(), "S");
        let it = it.with_body("B");
        assert_eq!(it.best_text(), "B");
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let raw = r#"{"title":"T","url":"http://x.com/a","source":"S",
                      "published_at":"2024-05-01T10:00:00Z"}"#;
        let it: NewsItem = serde_json::from_str(raw).unwrap();
        assert_eq!(it.published_at, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        assert!(!it.processed);
        assert!(it.body.is_empty());
    }

    #[test]
    fn empty_lead_image_is_none() {
        let it = NewsItem::new("T", "u", "s").with_lead_image(Some("  ".into()));
        assert!(it.lead_image_url.is_none());
    }

    #[test]
    fn slug_replaces_separators() {
        assert_eq!(topic_slug("climate change"), "climate_change");
        assert_eq!(topic_slug("  "), "topic");
    }
}
