// src/pipeline.rs
//! Per-item enrichment and the end-to-end run.
//!
//! [`Processor`] is synchronous and stateless across items: gate, then
//! summarizer, then question synthesizer. [`NewsBot`] sequences ingest,
//! processing, the image stage and distribution, and writes a snapshot after
//! each of the first three.

use anyhow::{bail, Result};
use metrics::{counter, gauge};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::gate::{GateOutcome, SentimentGate};
use crate::ingest::config::build_http_adapters;
use crate::ingest::run_once;
use crate::ingest::types::{AdapterError, SourceAdapter};
use crate::item::{save_snapshot, topic_slug, NewsItem};
use crate::notify::{save_delivery_reports, DeliveryReport, DistributionPayload, DistributorMux};
use crate::question::ner::Gazetteer;
use crate::question::select::{RngSelector, Selector};
use crate::question::QuestionSynthesizer;
use crate::summarize::{sentences, Summarizer};
use crate::telemetry::describe_pipeline_metrics;

/// Produces the image reference handed to distribution.
pub trait ImageStage: Send + Sync {
    fn render(&self, item: &NewsItem) -> Result<Option<String>>;
}

/// Passes the item's lead image URL through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadImageStage;

impl ImageStage for LeadImageStage {
    fn render(&self, item: &NewsItem) -> Result<Option<String>> {
        Ok(item.lead_image_url.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemOutcome {
    Enriched,
    /// Tombstoned by the gate with this compound score.
    Rejected(f32),
}

/// Result of processing a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Enriched items plus items passed through after an error, in input order.
    pub items: Vec<NewsItem>,
    /// URLs dropped by the gate.
    pub rejected: Vec<String>,
    /// Items that failed and were passed through unenriched.
    pub failed: usize,
}

pub struct Processor {
    gate: SentimentGate,
    summarizer: Summarizer,
    synthesizer: QuestionSynthesizer,
}

impl Processor {
    pub fn new(gate: SentimentGate, summarizer: Summarizer, synthesizer: QuestionSynthesizer) -> Self {
        Self {
            gate,
            summarizer,
            synthesizer,
        }
    }

    /// Stages configured from `cfg`; gazetteer files come from the NER dir.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let gate = SentimentGate::new(cfg.gate.threshold).enabled(cfg.gate.enabled);
        let summarizer = Summarizer::new(cfg.summarizer.max_sentences, cfg.summarizer.min_sentences);
        let synthesizer =
            QuestionSynthesizer::new(cfg.questions.question_types.clone(), Gazetteer::load_default());
        Self::new(gate, summarizer, synthesizer)
    }

    /// Gate, summarize and ask about one item in place.
    pub fn process_item(&self, item: &mut NewsItem, sel: &mut dyn Selector) -> Result<ItemOutcome> {
        if item.title.trim().is_empty() {
            bail!("item {} has an empty title", item.url);
        }

        if let GateOutcome::Rejected(score) = self.gate.evaluate(item) {
            return Ok(ItemOutcome::Rejected(score.compound));
        }

        let max = self.summarizer.max_sentences();
        if item.summary.trim().is_empty() {
            item.summary = if item.body.trim().is_empty() {
                item.title.clone()
            } else {
                self.summarizer.summarize_default(&item.body)
            };
        } else if sentences(&item.summary).len() > max {
            item.summary = self.summarizer.summarize_default(&item.summary);
        }

        let basis = [&item.summary, &item.body, &item.title]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_default();
        item.question = self.synthesizer.synthesize(&basis, sel);
        item.processed = true;
        Ok(ItemOutcome::Enriched)
    }

    /// Process every item independently. Failures never stop the batch.
    pub fn process_batch(&self, items: Vec<NewsItem>, sel: &mut dyn Selector) -> BatchReport {
        describe_pipeline_metrics();
        let mut report = BatchReport::default();

        for item in items {
            let mut work = item.clone();
            match self.process_item(&mut work, sel) {
                Ok(ItemOutcome::Enriched) => {
                    counter!("pipeline_processed_total").increment(1);
                    report.items.push(work);
                }
                Ok(ItemOutcome::Rejected(_)) => report.rejected.push(work.url),
                Err(e) => {
                    counter!("pipeline_item_errors_total").increment(1);
                    tracing::error!(target: "pipeline", url = %item.url, error = ?e, "processing failed, passing item through");
                    report.failed += 1;
                    report.items.push(item);
                }
            }
        }

        tracing::info!(
            target: "pipeline",
            kept = report.items.len(),
            rejected = report.rejected.len(),
            failed = report.failed,
            "batch processed"
        );
        report
    }
}

/// Summary of one end-to-end run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub topic: String,
    pub candidates: usize,
    pub duplicates: usize,
    pub adapter_errors: Vec<AdapterError>,
    pub rejected: Vec<String>,
    pub failed: usize,
    pub items: Vec<NewsItem>,
    pub deliveries: Vec<DeliveryReport>,
    pub snapshots: Vec<PathBuf>,
}

pub struct NewsBot {
    output_dir: PathBuf,
    max_results: usize,
    seed: Option<u64>,
    adapters: Vec<Box<dyn SourceAdapter>>,
    processor: Processor,
    images: Box<dyn ImageStage>,
    distributor: DistributorMux,
    dry_run: bool,
}

impl NewsBot {
    /// Bot over the given adapters; stages come from `cfg`, no distribution targets.
    pub fn new(cfg: &AppConfig, adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self {
            output_dir: cfg.output_dir.clone(),
            max_results: cfg.ingest.max_results_per_source,
            seed: cfg.questions.seed,
            adapters,
            processor: Processor::from_config(cfg),
            images: Box::new(LeadImageStage),
            distributor: DistributorMux::default(),
            dry_run: false,
        }
    }

    /// Live HTTP adapters and configured distribution targets.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let adapters =
            build_http_adapters(&cfg.sources, &cfg.ingest.user_agent, cfg.ingest.timeout_secs)?;
        let distributor = DistributorMux::from_config(&cfg.distribution)?;
        Ok(Self::new(cfg, adapters).with_distributor(distributor))
    }

    pub fn with_processor(mut self, processor: Processor) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_image_stage(mut self, stage: Box<dyn ImageStage>) -> Self {
        self.images = stage;
        self
    }

    pub fn with_distributor(mut self, distributor: DistributorMux) -> Self {
        self.distributor = distributor;
        self
    }

    pub fn dry_run(mut self, on: bool) -> Self {
        self.dry_run = on;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn snapshot_path(&self, slug: &str, stage: &str) -> PathBuf {
        self.output_dir.join(format!("{slug}_{stage}.json"))
    }

    /// Ingest, process, attach images and distribute for `topic`.
    pub async fn run(&self, topic: &str) -> Result<RunReport> {
        let slug = topic_slug(topic);
        let mut snapshots = Vec::new();

        let agg = run_once(&self.adapters, topic, self.max_results).await;
        let raw_path = self.snapshot_path(&slug, "raw");
        save_snapshot(&raw_path, &agg.items)?;
        snapshots.push(raw_path);

        let mut sel = RngSelector::from_seed(self.seed);
        let mut batch = self.processor.process_batch(agg.items, &mut sel);
        let processed_path = self.snapshot_path(&slug, "processed");
        save_snapshot(&processed_path, &batch.items)?;
        snapshots.push(processed_path);

        for item in batch.items.iter_mut().filter(|i| i.processed) {
            match self.images.render(item) {
                Ok(path) => item.rendered_image_path = path,
                Err(e) => {
                    tracing::warn!(target: "pipeline", url = %item.url, error = ?e, "image stage failed")
                }
            }
        }
        let images_path = self.snapshot_path(&slug, "with_images");
        save_snapshot(&images_path, &batch.items)?;
        snapshots.push(images_path);

        let mut deliveries = Vec::new();
        if self.dry_run {
            tracing::info!(target: "pipeline", "dry run, skipping distribution");
        } else if !self.distributor.is_empty() {
            let payloads: Vec<DistributionPayload> = batch
                .items
                .iter()
                .filter(|i| i.processed)
                .map(DistributionPayload::from)
                .collect();
            deliveries = self.distributor.distribute(&payloads).await;
            let results_path = self.output_dir.join(format!("{slug}_posting_results.json"));
            save_delivery_reports(&results_path, &deliveries)?;
        }

        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        tracing::info!(
            target: "pipeline",
            topic,
            items = batch.items.len(),
            rejected = batch.rejected.len(),
            deliveries = deliveries.len(),
            "run finished"
        );

        Ok(RunReport {
            topic: topic.to_string(),
            candidates: agg.candidates,
            duplicates: agg.duplicates,
            adapter_errors: agg.errors,
            rejected: batch.rejected,
            failed: batch.failed,
            items: batch.items,
            deliveries,
            snapshots,
        })
    }
}
