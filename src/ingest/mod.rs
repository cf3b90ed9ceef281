// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{AdapterError, AggregateReport, SourceAdapter};
use crate::item::NewsItem;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// Titles longer than this are cut (character count).
const TITLE_MAX_CHARS: usize = 300;

/// One-time metrics registration (so series show up in the exposition).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Candidate items returned by adapters.");
        describe_counter!("ingest_kept_total", "Items kept after deduplication.");
        describe_counter!("ingest_dedup_total", "Items removed as duplicate URLs.");
        describe_counter!(
            "ingest_adapter_errors_total",
            "Adapter fetch/parse errors."
        );
        describe_histogram!("ingest_parse_ms", "Adapter parse time in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when aggregation last ran."
        );
    });
}

/// Normalize text: decode entities, drop markup, fold quotes and whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) Drop script/style blocks entirely
    static RE_BLOCKS: OnceCell<regex::Regex> = OnceCell::new();
    let re_blocks = RE_BLOCKS.get_or_init(|| {
        regex::Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>").unwrap()
    });
    let out = re_blocks.replace_all(s, " ");

    // 2) Strip HTML tags (before decoding so escaped `&lt;` text survives)
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let out = re_tags.replace_all(&out, " ");

    // 3) HTML entity decode
    let mut out = html_escape::decode_html_entities(&out).to_string();

    // 4) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 5) Collapse whitespace (incl. nbsp)
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{00A0}]+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Normalized title with a length cap.
pub fn clean_title(s: &str) -> String {
    let out = normalize_text(s);
    if out.chars().count() > TITLE_MAX_CHARS {
        out.chars().take(TITLE_MAX_CHARS).collect()
    } else {
        out
    }
}

/// Lowercased, whitespace-split topic keywords.
pub fn topic_keywords(topic: &str) -> Vec<String> {
    topic
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// True when any keyword occurs in any of `haystacks` (case-insensitive).
/// An empty keyword list matches everything.
pub fn matches_topic(keywords: &[String], haystacks: &[&str]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let lowered: Vec<String> = haystacks.iter().map(|h| h.to_lowercase()).collect();
    keywords
        .iter()
        .any(|k| lowered.iter().any(|h| h.contains(k.as_str())))
}

/// Union adapter lists in registration order, keep the first item per URL, then
/// order by `published_at` descending. The sort is stable, so equal timestamps
/// keep their input order.
///
/// Returns the kept items and the number of duplicates dropped.
pub fn aggregate(lists: Vec<Vec<NewsItem>>) -> (Vec<NewsItem>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();
    let mut dup = 0usize;

    for item in lists.into_iter().flatten() {
        if !seen.insert(item.url.clone()) {
            dup += 1;
            continue;
        }
        kept.push(item);
    }

    kept.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    (kept, dup)
}

/// Run every adapter once for `topic`, capping each to `max_results`, and
/// aggregate the results. Adapter errors are recorded, never raised.
pub async fn run_once(
    adapters: &[Box<dyn SourceAdapter>],
    topic: &str,
    max_results: usize,
) -> AggregateReport {
    ensure_metrics_described();

    let mut lists = Vec::with_capacity(adapters.len());
    let mut errors = Vec::new();
    for a in adapters {
        match a.fetch(topic, max_results).await {
            Ok(mut v) => {
                v.truncate(max_results);
                tracing::info!(target: "ingest", adapter = a.name(), items = v.len(), "adapter fetched");
                counter!("ingest_items_total").increment(v.len() as u64);
                lists.push(v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, adapter = a.name(), "adapter error");
                counter!("ingest_adapter_errors_total").increment(1);
                errors.push(AdapterError {
                    adapter: a.name().to_string(),
                    message: format!("{e:#}"),
                });
            }
        }
    }

    let candidates = lists.iter().map(Vec::len).sum();
    let (items, duplicates) = aggregate(lists);

    // Telemetry
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    counter!("ingest_kept_total").increment(items.len() as u64);
    counter!("ingest_dedup_total").increment(duplicates as u64);
    gauge!("ingest_pipeline_last_run_ts").set(now as f64);

    tracing::info!(
        target: "ingest",
        topic,
        candidates,
        kept = items.len(),
        duplicates,
        failed_adapters = errors.len(),
        "aggregation finished"
    );

    AggregateReport {
        items,
        candidates,
        duplicates,
        errors,
    }
}
