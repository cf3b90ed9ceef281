// src/ingest/providers/mod.rs
//! Source adapters and the small fetch layer they share.
//!
//! Every adapter reads documents through a [`PageSource`]: either live HTTP via
//! `reqwest`, or an in-memory fixture map keyed by URL (tests, offline runs).

pub mod feed_rss;
pub mod search;
pub mod website;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

pub use feed_rss::FeedAdapter;
pub use search::SearchAdapter;
pub use website::WebsiteAdapter;

/// Where adapter documents come from.
#[derive(Clone)]
pub enum PageSource {
    Http(reqwest::Client),
    // Own copies so tests need no 'static data.
    Fixture(HashMap<String, String>),
}

impl PageSource {
    /// HTTP client with the configured user agent and timeout.
    pub fn http(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("building http client")?;
        Ok(Self::Http(client))
    }

    pub fn fixtures<I, K, V>(docs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Fixture(docs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Fetch a document body as text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        match self {
            Self::Fixture(docs) => docs
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("no fixture for {url}")),
            Self::Http(client) => {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("http get {url}"))?
                    .error_for_status()
                    .with_context(|| format!("http status {url}"))?;
                resp.text().await.with_context(|| format!("http body {url}"))
            }
        }
    }
}

/// RFC 2822 (RSS `pubDate`) to UTC. Obsolete zone names go through chrono.
pub(crate) fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| Utc.timestamp_opt(x, 0).single())
        .or_else(|| {
            DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Best-effort date parsing for page metadata and feeds.
///
/// Tries RFC 3339, RFC 2822, then a few common naive layouts (read as UTC).
pub(crate) fn parse_loose_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = parse_rfc2822(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&n));
        }
    }
    // Month-name and numeric dates; US order wins over European on ambiguity.
    for fmt in ["%Y-%m-%d", "%B %d, %Y", "%d %B %Y", "%m/%d/%Y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n));
        }
    }
    None
}

/// Host part of a URL, used as a source label.
pub(crate) fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Resolve `href` against `base`; absolute links pass through.
pub(crate) fn absolutize(base: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    url::Url::parse(base)
        .ok()
        .and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
}
