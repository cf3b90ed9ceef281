// tests/providers_feed.rs
use chrono::{TimeZone, Utc};
use newsbot::ingest::providers::{FeedAdapter, PageSource, SearchAdapter};
use newsbot::ingest::types::SourceAdapter;

const WIRE: &str = include_str!("fixtures/wire_feed.xml");
const SEARCH: &str = include_str!("fixtures/search_results.xml");

fn wire_pages() -> PageSource {
    PageSource::fixtures([("https://wire.test/rss", WIRE)])
}

#[tokio::test]
async fn feed_keeps_topic_entries_in_feed_order() {
    // wide window so the 2024 fixture dates stay in range
    let a = FeedAdapter::new(vec!["https://wire.test/rss".into()], 36_500, wire_pages());
    let items = a.fetch("climate", 10).await.unwrap();

    let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://wire.test/climate-summit",
            "https://wire.test/climate-report",
            "https://shared.test/march",
        ]
    );
    assert!(items.iter().all(|i| i.source == "World Wire"));

    let summit = &items[0];
    assert_eq!(
        summit.published_at,
        Utc.with_ymd_and_hms(2024, 5, 14, 8, 0, 0).unwrap()
    );
    assert_eq!(summit.summary, "Delegates gathered for the climate summit.");
    assert!(summit.body.starts_with("Delegates from nearly every country"));
    assert!(!summit.body.contains("<p>"));
    assert_eq!(
        summit.lead_image_url.as_deref(),
        Some("https://wire.test/img/summit.jpg")
    );

    let report = &items[1];
    assert_eq!(
        report.published_at,
        Utc.with_ymd_and_hms(2024, 5, 13, 10, 0, 0).unwrap()
    );
    assert_eq!(
        report.lead_image_url.as_deref(),
        Some("https://wire.test/img/report.jpg")
    );
    assert_eq!(report.body, report.summary);
}

#[tokio::test]
async fn dateless_entry_is_stamped_now() {
    let before = Utc::now();
    let a = FeedAdapter::new(vec!["https://wire.test/rss".into()], 36_500, wire_pages());
    let items = a.fetch("climate", 10).await.unwrap();
    let march = items
        .iter()
        .find(|i| i.url == "https://shared.test/march")
        .unwrap();
    assert!(march.published_at >= before);
    assert!(march.lead_image_url.is_none());
}

#[tokio::test]
async fn old_entries_fall_out_of_the_window() {
    let a = FeedAdapter::new(vec!["https://wire.test/rss".into()], 1, wire_pages());
    let items = a.fetch("climate", 10).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].url, "https://shared.test/march");
}

#[tokio::test]
async fn max_results_caps_the_feed() {
    let a = FeedAdapter::new(vec!["https://wire.test/rss".into()], 36_500, wire_pages());
    let items = a.fetch("climate", 2).await.unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn one_broken_feed_is_tolerated_all_broken_is_an_error() {
    let a = FeedAdapter::new(
        vec!["https://gone.test/rss".into(), "https://wire.test/rss".into()],
        36_500,
        wire_pages(),
    );
    assert_eq!(a.fetch("climate", 10).await.unwrap().len(), 3);

    let pages = PageSource::fixtures([("https://junk.test/rss", "<html>not a feed")]);
    let a = FeedAdapter::new(
        vec!["https://gone.test/rss".into(), "https://junk.test/rss".into()],
        36_500,
        pages,
    );
    assert!(a.fetch("climate", 10).await.is_err());
}

#[tokio::test]
async fn search_uses_per_item_publisher() {
    let a = SearchAdapter::new(
        "https://search.test/rss".into(),
        None,
        PageSource::fixtures(Vec::<(String, String)>::new()),
    );
    let url = a.query_url("climate").unwrap();
    assert_eq!(url, "https://search.test/rss?q=climate+news&hl=en");

    let a = SearchAdapter::new(
        "https://search.test/rss".into(),
        None,
        PageSource::fixtures([(url.as_str(), SEARCH)]),
    );
    let items = a.fetch("climate", 10).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].source, "Metro Daily");
    assert_eq!(items[1].source, "Biz Times");
    assert_eq!(items[0].url, "https://shared.test/march");
}

#[tokio::test]
async fn search_failure_is_an_error() {
    let a = SearchAdapter::new(
        "https://search.test/rss".into(),
        Some("1d".into()),
        PageSource::fixtures(Vec::<(String, String)>::new()),
    );
    assert!(a.fetch("climate", 10).await.is_err());
}

#[tokio::test]
async fn atom_feed_is_read_like_rss() {
    let pages = PageSource::fixtures([(
        "https://atom.test/.rss",
        include_str!("fixtures/atom_feed.xml"),
    )]);
    let a = FeedAdapter::new(vec!["https://atom.test/.rss".into()], 36_500, pages);
    let items = a.fetch("climate", 10).await.unwrap();

    let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["https://atom.test/climate-bill", "https://atom.test/oslo"]);
    assert!(items.iter().all(|i| i.source == "Atom Desk"));

    let bill = &items[0];
    // published wins over updated
    assert_eq!(
        bill.published_at,
        Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap()
    );
    assert_eq!(bill.summary, "Lawmakers passed the climate bill.");
    assert_eq!(
        bill.body,
        "Lawmakers passed the climate bill late on Tuesday. The vote was close."
    );
    assert_eq!(
        bill.lead_image_url.as_deref(),
        Some("https://atom.test/img/bill.jpg")
    );

    let oslo = &items[1];
    assert_eq!(
        oslo.published_at,
        Utc.with_ymd_and_hms(2024, 5, 12, 8, 0, 0).unwrap()
    );
    assert_eq!(
        oslo.lead_image_url.as_deref(),
        Some("https://atom.test/img/oslo.jpg")
    );
}

#[tokio::test]
async fn unbounded_age_window_does_not_abort_the_run() {
    use newsbot::ingest::run_once;

    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(FeedAdapter::new(
        vec!["https://wire.test/rss".into()],
        u32::MAX,
        wire_pages(),
    ))];
    let report = run_once(&adapters, "climate", 10).await;
    assert!(report.errors.is_empty());
    assert_eq!(report.items.len(), 3);
}
