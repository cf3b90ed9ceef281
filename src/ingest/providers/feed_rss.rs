// src/ingest/providers/feed_rss.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use metrics::histogram;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use super::{host_of, parse_loose_datetime, PageSource};
use crate::ingest::types::SourceAdapter;
use crate::ingest::{clean_title, matches_topic, normalize_text, topic_keywords};
use crate::item::NewsItem;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "date", alias = "dc:date")]
    dc_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "encoded", alias = "content:encoded")]
    encoded: Option<String>,
    /// Publisher label some search feeds attach per item.
    source: Option<SourceTag>,
    #[serde(rename = "content", alias = "media:content", default)]
    media: Vec<MediaRef>,
    #[serde(rename = "thumbnail", alias = "media:thumbnail", default)]
    thumbnails: Vec<MediaRef>,
    #[serde(default)]
    enclosure: Vec<MediaRef>,
}

#[derive(Debug, Deserialize)]
struct SourceTag {
    #[serde(rename = "$text", default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@medium")]
    medium: Option<String>,
    #[serde(rename = "@type")]
    mime: Option<String>,
}

impl MediaRef {
    fn is_image(&self) -> bool {
        self.medium.as_deref() == Some("image")
            || self
                .mime
                .as_deref()
                .is_some_and(|m| m.starts_with("image/"))
    }
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

/// Atom text construct (`type="text"` or `"html"`).
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
    #[serde(rename = "@type")]
    mime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    #[serde(rename = "thumbnail", alias = "media:thumbnail", default)]
    thumbnails: Vec<MediaRef>,
}

impl AtomEntry {
    /// Same shape as an RSS entry: alternate link, `published` else `updated`,
    /// `content` as full text and enclosure links as media.
    fn into_item(self) -> Item {
        let mut link = None;
        let mut enclosure = Vec::new();
        for l in self.links {
            match l.rel.as_deref() {
                None | Some("alternate") if link.is_none() => link = l.href,
                Some("enclosure") => enclosure.push(MediaRef {
                    url: l.href,
                    medium: None,
                    mime: l.mime,
                }),
                _ => {}
            }
        }
        Item {
            title: self.title.map(|t| t.value),
            link,
            pub_date: None,
            dc_date: self.published.or(self.updated),
            description: self.summary.map(|t| t.value),
            encoded: self.content.map(|t| t.value),
            source: None,
            media: Vec::new(),
            thumbnails: self.thumbnails,
            enclosure,
        }
    }
}

/// Local name of the document element (`rss`, `feed`, ...).
fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Parsed channel: title plus raw entries.
pub(crate) struct ParsedFeed {
    pub title: Option<String>,
    pub items: Vec<Item>,
}

/// Parse RSS 2.0 (with `media:` / `content:` extensions) or Atom 1.0 XML.
pub(crate) fn parse_feed(xml: &str) -> Result<ParsedFeed> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let (title, items) = if root_element(&xml_clean).as_deref() == Some("feed") {
        let atom: AtomFeed = from_str(&xml_clean).context("parsing atom xml")?;
        let items = atom.entries.into_iter().map(AtomEntry::into_item).collect();
        (atom.title.map(|t| t.value), items)
    } else {
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
        (rss.channel.title, rss.channel.item)
    };
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    Ok(ParsedFeed {
        title: title.map(|t| normalize_text(&t)).filter(|t| !t.is_empty()),
        items,
    })
}

impl Item {
    /// Canonical item for this entry; `None` when it has no link or title.
    pub(crate) fn into_news_item(self, fallback_source: &str) -> Option<NewsItem> {
        let url = self.link.as_deref().map(str::trim).filter(|l| !l.is_empty())?.to_string();
        let title = clean_title(self.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            return None;
        }

        let description = normalize_text(self.description.as_deref().unwrap_or_default());
        let body = match self.encoded.as_deref().map(normalize_text) {
            Some(full) if !full.is_empty() => full,
            _ => description.clone(),
        };
        let published = self
            .pub_date
            .as_deref()
            .or(self.dc_date.as_deref())
            .and_then(parse_loose_datetime);
        let image = self
            .media
            .iter()
            .chain(self.enclosure.iter())
            .find(|m| m.is_image())
            .or_else(|| self.thumbnails.first())
            .and_then(|m| m.url.clone());
        let source = self
            .source
            .map(|s| normalize_text(&s.name))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback_source.to_string());

        Some(
            NewsItem::new(title, url, source)
                .published(published)
                .with_body(body)
                .with_summary(description)
                .with_lead_image(image),
        )
    }

    fn title_and_description(&self) -> (&str, &str) {
        (
            self.title.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
        )
    }
}

/// Syndication-feed adapter: keeps recent entries that mention the topic.
pub struct FeedAdapter {
    feeds: Vec<String>,
    max_age_days: i64,
    pages: PageSource,
}

impl FeedAdapter {
    pub fn new(feeds: Vec<String>, max_age_days: u32, pages: PageSource) -> Self {
        Self {
            feeds,
            max_age_days: i64::from(max_age_days),
            pages,
        }
    }

    fn collect(
        &self,
        feed_url: &str,
        parsed: ParsedFeed,
        keywords: &[String],
        out: &mut Vec<NewsItem>,
        max_results: usize,
    ) {
        let source = parsed
            .title
            .or_else(|| host_of(feed_url))
            .unwrap_or_else(|| "RSS".to_string());
        // a window reaching past the representable range means no age limit
        let oldest = Duration::try_days(self.max_age_days)
            .and_then(|d| Utc::now().checked_sub_signed(d));

        for entry in parsed.items {
            if out.len() >= max_results {
                break;
            }
            let (title, description) = entry.title_and_description();
            if !matches_topic(keywords, &[title, description]) {
                continue;
            }
            let Some(item) = entry.into_news_item(&source) else {
                continue;
            };
            if oldest.is_some_and(|o| item.published_at < o) {
                tracing::debug!(target: "ingest", url = %item.url, "feed entry too old");
                continue;
            }
            out.push(item);
        }
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let keywords = topic_keywords(topic);
        let mut out = Vec::new();
        let mut failures = 0usize;

        for feed_url in &self.feeds {
            if out.len() >= max_results {
                break;
            }
            let parsed = match self.pages.get_text(feed_url).await {
                Ok(xml) => parse_feed(&xml),
                Err(e) => Err(e),
            };
            match parsed {
                Ok(parsed) => self.collect(feed_url, parsed, &keywords, &mut out, max_results),
                Err(e) => {
                    failures += 1;
                    tracing::warn!(target: "ingest", error = ?e, feed = %feed_url, "feed error");
                }
            }
        }

        if failures > 0 && failures == self.feeds.len() {
            bail!("all {failures} feeds failed");
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "feed"
    }
}

pub(crate) fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Test Wire</title>
    <item>
      <title>Climate talks resume</title>
      <link>https://wire.test/a</link>
      <description>&lt;p&gt;Delegates met again.&lt;/p&gt;</description>
      <media:content url="https://wire.test/a.jpg" medium="image"/>
    </item>
    <item>
      <title>No link here</title>
      <description>climate</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_channel_and_entries() {
        let parsed = parse_feed(XML).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Test Wire"));
        let items: Vec<NewsItem> = parsed
            .items
            .into_iter()
            .filter_map(|i| i.into_news_item("fallback"))
            .collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].body, "Delegates met again.");
        assert_eq!(items[0].lead_image_url.as_deref(), Some("https://wire.test/a.jpg"));
        assert_eq!(items[0].source, "fallback");
    }

    #[test]
    fn atom_entries_map_onto_items() {
        let xml = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Desk</title>
  <entry>
    <title>Climate talks resume</title>
    <link rel="self" href="https://atom.test/self/1"/>
    <link rel="alternate" href="https://atom.test/a"/>
    <updated>2024-05-14T08:30:00Z</updated>
    <summary>Delegates met again.</summary>
  </entry>
</feed>"#;
        let parsed = parse_feed(xml).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Atom Desk"));
        let items: Vec<NewsItem> = parsed
            .items
            .into_iter()
            .filter_map(|i| i.into_news_item("fallback"))
            .collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://atom.test/a");
        assert_eq!(items[0].summary, "Delegates met again.");
        assert_eq!(items[0].published_at.to_rfc3339(), "2024-05-14T08:30:00+00:00");
    }

    #[test]
    fn root_element_is_detected() {
        assert_eq!(root_element("<?xml version=\"1.0\"?><feed/>").as_deref(), Some("feed"));
        assert_eq!(root_element("<rss><channel/></rss>").as_deref(), Some("rss"));
        assert_eq!(root_element("no markup"), None);
    }

    #[tokio::test]
    async fn huge_age_window_means_no_limit() {
        let pages = PageSource::fixtures([("https://wire.test/rss", XML)]);
        let a = FeedAdapter::new(vec!["https://wire.test/rss".into()], u32::MAX, pages);
        let items = a.fetch("climate", 10).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn empty_channel_is_ok() {
        let parsed = parse_feed("<rss><channel><title>x</title></channel></rss>").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn scrub_replaces_html_only_entities() {
        assert_eq!(scrub_html_entities_for_xml("a&nbsp;b&mdash;c"), "a b-c");
    }
}
