// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod gate;
pub mod ingest;
pub mod item;
pub mod notify;
pub mod pipeline;
pub mod question;
pub mod sentiment;
pub mod summarize;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::AppConfig;
pub use crate::gate::{GateOutcome, SentimentGate};
pub use crate::ingest::aggregate;
pub use crate::item::{load_snapshot, save_snapshot, NewsItem, SentimentScore, Snapshot};
pub use crate::pipeline::{NewsBot, Processor};
pub use crate::question::QuestionSynthesizer;
pub use crate::summarize::Summarizer;
