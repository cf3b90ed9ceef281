// tests/providers_website.rs
use chrono::{TimeZone, Utc};
use newsbot::ingest::providers::{PageSource, WebsiteAdapter};
use newsbot::ingest::types::SourceAdapter;

const FRONT: &str = include_str!("fixtures/site_front.html");
const ARTICLE: &str = include_str!("fixtures/site_article.html");

fn pages() -> PageSource {
    PageSource::fixtures([
        ("https://site.test/", FRONT),
        ("https://site.test/world/climate-deal", ARTICLE),
    ])
}

#[tokio::test]
async fn scrapes_topic_articles_from_front_page() {
    let a = WebsiteAdapter::new(vec!["https://site.test/".into()], pages());
    let items = a.fetch("climate", 10).await.unwrap();

    // the missing article page is skipped, the duplicate link fetched once
    assert_eq!(items.len(), 1);
    let it = &items[0];
    assert_eq!(it.url, "https://site.test/world/climate-deal");
    assert_eq!(it.title, "Leaders strike climate deal");
    assert_eq!(it.source, "site.test");
    assert_eq!(
        it.published_at,
        Utc.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).unwrap()
    );
    assert_eq!(
        it.lead_image_url.as_deref(),
        Some("https://site.test/img/deal.jpg")
    );
    assert!(it.body.contains("World leaders agreed on a climate deal"));
    assert!(!it.body.contains("trackPageView"));
    assert!(!it.body.contains("Cup final"));
    assert!(it.summary.is_empty());
}

#[tokio::test]
async fn off_topic_front_page_yields_nothing() {
    let a = WebsiteAdapter::new(vec!["https://site.test/".into()], pages());
    assert!(a.fetch("elections", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_sites_fail_the_adapter() {
    let a = WebsiteAdapter::new(
        vec!["https://down.test/".into()],
        PageSource::fixtures(Vec::<(String, String)>::new()),
    );
    assert!(a.fetch("climate", 10).await.is_err());

    let a = WebsiteAdapter::new(
        vec!["https://down.test/".into(), "https://site.test/".into()],
        pages(),
    );
    assert_eq!(a.fetch("climate", 10).await.unwrap().len(), 1);
}
