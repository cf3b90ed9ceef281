// tests/pipeline_scenarios.rs
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use newsbot::ingest::config::{build_adapters, SourceConfig};
use newsbot::ingest::providers::PageSource;
use newsbot::notify::{DistributionPayload, Distributor, DistributorMux};
use newsbot::pipeline::{ImageStage, NewsBot, Processor};
use newsbot::question::select::FixedSelector;
use newsbot::question::GENERIC_PROMPTS;
use newsbot::sentiment::Scorer;
use newsbot::summarize::sentences;
use newsbot::{
    load_snapshot, AppConfig, NewsItem, QuestionSynthesizer, SentimentGate, SentimentScore,
    Summarizer,
};

/// Scores by keyword so one run can mix rejected and accepted items.
struct KeywordScorer;

impl Scorer for KeywordScorer {
    fn score(&self, text: &str) -> SentimentScore {
        let compound = if text.contains("heat") { -0.8 } else { -0.3 };
        SentimentScore {
            compound,
            ..SentimentScore::neutral()
        }
    }
}

struct Fixed(f32);

impl Scorer for Fixed {
    fn score(&self, _text: &str) -> SentimentScore {
        SentimentScore {
            compound: self.0,
            ..SentimentScore::neutral()
        }
    }
}

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<DistributionPayload>>>,
}

#[async_trait]
impl Distributor for Recorder {
    fn target(&self) -> &str {
        "recorder"
    }
    async fn deliver(&self, payload: &DistributionPayload) -> Result<()> {
        if payload.url.contains("markets") {
            bail!("rate limited");
        }
        self.seen.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

struct FailingImages;

impl ImageStage for FailingImages {
    fn render(&self, _item: &NewsItem) -> Result<Option<String>> {
        bail!("renderer offline")
    }
}

fn processor(scorer: Box<dyn Scorer>) -> Processor {
    Processor::new(
        SentimentGate::with_scorer(scorer, -0.5),
        Summarizer::default(),
        QuestionSynthesizer::default(),
    )
}

fn fixture_pages() -> PageSource {
    PageSource::fixtures([
        ("https://wire.test/rss", include_str!("fixtures/wire_feed.xml")),
        (
            "https://search.test/rss?q=climate+news&hl=en",
            include_str!("fixtures/search_results.xml"),
        ),
        ("https://site.test/", include_str!("fixtures/site_front.html")),
        (
            "https://site.test/world/climate-deal",
            include_str!("fixtures/site_article.html"),
        ),
    ])
}

fn fixture_bot(out: &std::path::Path) -> NewsBot {
    let cfg = AppConfig {
        output_dir: out.to_path_buf(),
        sources: vec![
            SourceConfig::Feed {
                feeds: vec!["https://wire.test/rss".into()],
                max_age_days: 36_500,
            },
            SourceConfig::Search {
                endpoint: "https://search.test/rss".into(),
                time_period: None,
                language: None,
            },
            SourceConfig::Website {
                sites: vec!["https://site.test/".into()],
            },
        ],
        ..AppConfig::default()
    };
    let adapters = build_adapters(&cfg.sources, &fixture_pages());
    NewsBot::new(&cfg, adapters).with_processor(processor(Box::new(KeywordScorer)))
}

#[test]
fn gate_drops_strongly_negative_and_keeps_mild() {
    let grim = processor(Box::new(Fixed(-0.8)));
    let out = grim.process_batch(vec![NewsItem::new("Grim", "a", "s")], &mut FixedSelector(0));
    assert!(out.items.is_empty());
    assert_eq!(out.rejected, vec!["a".to_string()]);

    let mild = processor(Box::new(Fixed(-0.3)));
    let out = mild.process_batch(vec![NewsItem::new("Mild", "b", "s")], &mut FixedSelector(0));
    assert_eq!(out.items.len(), 1);
    assert!(out.items[0].processed);
    assert_eq!(out.items[0].sentiment.unwrap().compound, -0.3);
}

#[test]
fn summary_is_the_most_informative_sentence() {
    let text = "The quick brown fox jumps over the lazy dog. It was a sunny day. Everyone was happy.";
    assert_eq!(
        Summarizer::summarize(text, 3, 1),
        "The quick brown fox jumps over the lazy dog."
    );
}

#[test]
fn summary_respects_bounds_and_document_order() {
    let text = "Parliament debated the new climate bill on Monday. \
        Opposition leaders criticized the climate bill sharply. \
        The weather was mild. \
        Ministers defended the climate bill in parliament. \
        Voters remain divided over the bill. \
        Lunch was served at noon. \
        Analysts expect the climate bill to pass parliament. \
        The session closed late.";
    let all = sentences(text);
    for max in 1..=4 {
        let summary = Summarizer::summarize(text, max, 1);
        let picked = sentences(&summary);
        assert!(!picked.is_empty());
        assert!(picked.len() <= max);
        let positions: Vec<usize> = picked
            .iter()
            .map(|s| all.iter().position(|a| a == s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn text_without_content_words_gets_a_generic_question() {
    let q = QuestionSynthesizer::default();
    let question = q.synthesize("it is what it is", &mut FixedSelector(2));
    assert_eq!(question, GENERIC_PROMPTS[2]);
    assert!(GENERIC_PROMPTS.contains(&q.synthesize("", &mut FixedSelector(7)).as_str()));
}

#[tokio::test]
async fn dry_run_writes_three_snapshots() {
    let tmp = tempfile::tempdir().unwrap();
    let bot = fixture_bot(tmp.path()).dry_run(true);
    let report = bot.run("climate").await.unwrap();

    assert_eq!(report.candidates, 6);
    assert_eq!(report.duplicates, 1);
    assert!(report.adapter_errors.is_empty());
    assert_eq!(report.rejected, vec!["https://wire.test/climate-report".to_string()]);
    assert_eq!(report.failed, 0);
    assert_eq!(report.items.len(), 4);
    assert!(report.deliveries.is_empty());

    let names: Vec<String> = report
        .snapshots
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "climate_raw.json",
            "climate_processed.json",
            "climate_with_images.json"
        ]
    );
    assert!(!tmp.path().join("climate_posting_results.json").exists());

    let raw = load_snapshot(&tmp.path().join("climate_raw.json")).unwrap();
    assert_eq!(raw.items.len(), 5);
    assert!(raw.items.iter().all(|i| !i.processed));

    let processed = load_snapshot(&tmp.path().join("climate_processed.json")).unwrap();
    assert_eq!(processed.items.len(), 4);
    for it in &processed.items {
        assert!(it.processed);
        assert!(!it.summary.is_empty());
        assert!(sentences(&it.summary).len() <= 3);
        assert!(it.question.ends_with('?'), "{}", it.question);
        assert!(it.rendered_image_path.is_none());
    }

    let with_images = load_snapshot(&tmp.path().join("climate_with_images.json")).unwrap();
    let summit = with_images
        .items
        .iter()
        .find(|i| i.url == "https://wire.test/climate-summit")
        .unwrap();
    assert_eq!(
        summit.rendered_image_path.as_deref(),
        Some("https://wire.test/img/summit.jpg")
    );
}

#[tokio::test]
async fn distribution_failures_are_reported_per_item() {
    let tmp = tempfile::tempdir().unwrap();
    let recorder = Recorder::default();
    let bot = fixture_bot(tmp.path())
        .with_distributor(DistributorMux::new(vec![Box::new(recorder.clone())]));
    let report = bot.run("climate").await.unwrap();

    assert_eq!(report.deliveries.len(), 4);
    let failed: Vec<&str> = report
        .deliveries
        .iter()
        .filter(|d| !d.success)
        .map(|d| d.url.as_str())
        .collect();
    assert_eq!(failed, vec!["https://search.test/markets"]);
    assert_eq!(recorder.seen.lock().unwrap().len(), 3);
    assert!(tmp.path().join("climate_posting_results.json").exists());
}

#[tokio::test]
async fn image_stage_failure_keeps_the_item() {
    let tmp = tempfile::tempdir().unwrap();
    let bot = fixture_bot(tmp.path())
        .with_image_stage(Box::new(FailingImages))
        .dry_run(true);
    let report = bot.run("climate").await.unwrap();
    assert_eq!(report.items.len(), 4);
    assert!(report.items.iter().all(|i| i.rendered_image_path.is_none()));
}
