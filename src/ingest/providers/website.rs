// src/ingest/providers/website.rs
//! Generic website adapter: front page → topic links → article pages.
//!
//! Extraction uses generic selectors only (`h1`, `article`, `og:image`,
//! `time[datetime]`); there is no per-site selector configuration.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::{absolutize, host_of, parse_loose_datetime, PageSource};
use crate::ingest::types::SourceAdapter;
use crate::ingest::{clean_title, matches_topic, normalize_text, topic_keywords};
use crate::item::NewsItem;

/// Links containing any of these are never articles.
const SKIP_LINK_PARTS: &[&str] = &[
    "login", "signin", "register", "about", "contact", "terms", "privacy", "advertise",
];

/// Elements whose text is never part of the article body.
const SKIP_BODY_TAGS: &[&str] = &["script", "style", "nav", "footer", "aside", "noscript", "form"];

pub struct WebsiteAdapter {
    sites: Vec<String>,
    pages: PageSource,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("bad selector {css}: {e:?}"))
}

/// Topic-relevant article links on a front page, in document order, deduped.
pub(crate) fn find_article_links(html: &str, base: &str, keywords: &[String]) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let a = selector("a[href]")?;
    let mut out: Vec<String> = Vec::new();

    for link in doc.select(&a) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(abs) = absolutize(base, href.trim()) else {
            continue;
        };
        let lower = abs.to_lowercase();
        if SKIP_LINK_PARTS.iter().any(|s| lower.contains(s)) {
            continue;
        }
        let text: String = link.text().collect();
        if !matches_topic(keywords, &[&text, &abs]) {
            continue;
        }
        if !out.contains(&abs) {
            out.push(abs);
        }
    }
    Ok(out)
}

/// Text of `root` without script/nav/footer noise.
fn body_text(root: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIP_BODY_TAGS.contains(&e.name()))
        });
        if hidden {
            continue;
        }
        raw.push_str(text);
        raw.push(' ');
    }
    normalize_text(&raw)
}

/// Main image: `og:image`, else a large or "featured" `<img>`, else the first one.
fn main_image(doc: &Html, page_url: &str) -> Result<Option<String>> {
    let og = selector(r#"meta[property="og:image"]"#)?;
    if let Some(content) = doc
        .select(&og)
        .find_map(|m| m.value().attr("content"))
        .filter(|c| !c.trim().is_empty())
    {
        return Ok(absolutize(page_url, content.trim()));
    }

    let img = selector("img[src]")?;
    let px = |v: Option<&str>| v.and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(0);
    let mut first = None;
    for el in doc.select(&img) {
        let e = el.value();
        let Some(src) = e.attr("src") else {
            continue;
        };
        if first.is_none() {
            first = Some(src);
        }
        let featured = e.classes().any(|c| {
            let c = c.to_lowercase();
            c.contains("featured") || c.contains("main")
        });
        if px(e.attr("width")) > 300 || px(e.attr("height")) > 200 || featured {
            return Ok(absolutize(page_url, src));
        }
    }
    Ok(first.and_then(|src| absolutize(page_url, src)))
}

/// Build a canonical item from an article page. `None` without a title.
pub(crate) fn parse_article(html: &str, url: &str) -> Result<Option<NewsItem>> {
    let doc = Html::parse_document(html);

    let mut title = String::new();
    for css in ["h1", "title"] {
        let sel = selector(css)?;
        if let Some(el) = doc.select(&sel).next() {
            title = clean_title(&el.text().collect::<String>());
            if !title.is_empty() {
                break;
            }
        }
    }
    if title.is_empty() {
        return Ok(None);
    }

    let mut body = String::new();
    for css in ["article", "main", "body"] {
        let sel = selector(css)?;
        if let Some(el) = doc.select(&sel).next() {
            body = body_text(el);
            if !body.is_empty() {
                break;
            }
        }
    }

    let time_sel = selector("time")?;
    let published = doc.select(&time_sel).next().and_then(|t| {
        t.value()
            .attr("datetime")
            .map(str::to_string)
            .or_else(|| Some(t.text().collect::<String>()))
            .and_then(|s| parse_loose_datetime(&s))
    });

    let image = main_image(&doc, url)?;
    let source = host_of(url).unwrap_or_else(|| "web".to_string());

    Ok(Some(
        NewsItem::new(title, url, source)
            .published(published)
            .with_body(body)
            .with_lead_image(image),
    ))
}

impl WebsiteAdapter {
    pub fn new(sites: Vec<String>, pages: PageSource) -> Self {
        Self { sites, pages }
    }

    async fn scrape_site(
        &self,
        site: &str,
        keywords: &[String],
        out: &mut Vec<NewsItem>,
        max_results: usize,
    ) -> Result<()> {
        let front = self.pages.get_text(site).await?;
        let mut links = find_article_links(&front, site, keywords)?;
        links.truncate(max_results);
        tracing::debug!(target: "ingest", site, links = links.len(), "relevant links");

        for link in links {
            if out.len() >= max_results {
                break;
            }
            let parsed = match self.pages.get_text(&link).await {
                Ok(html) => parse_article(&html, &link),
                Err(e) => Err(e),
            };
            match parsed {
                Ok(Some(item)) => out.push(item),
                Ok(None) => tracing::debug!(target: "ingest", url = %link, "article without title"),
                Err(e) => tracing::warn!(target: "ingest", error = ?e, url = %link, "article error"),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SourceAdapter for WebsiteAdapter {
    async fn fetch(&self, topic: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let keywords = topic_keywords(topic);
        let mut out = Vec::new();
        let mut failures = 0usize;

        for site in &self.sites {
            if out.len() >= max_results {
                break;
            }
            if let Err(e) = self.scrape_site(site, &keywords, &mut out, max_results).await {
                failures += 1;
                tracing::warn!(target: "ingest", error = ?e, site = %site, "website error");
            }
        }

        if failures > 0 && failures == self.sites.len() {
            bail!("all {failures} sites failed");
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "website"
    }
}
