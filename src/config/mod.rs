// src/config/mod.rs
//! Application configuration (TOML).
//!
//! Resolution order for [`AppConfig::load_default`]:
//! 1. `NEWSBOT_CONFIG` (path),
//! 2. `./config/newsbot.toml`,
//! 3. built-in defaults.
//!
//! Secrets may be written as `"ENV"`; they are then read from the matching
//! environment variable (`DISCORD_WEBHOOK_URL`, `SLACK_WEBHOOK_URL`,
//! `SMTP_USER`, `SMTP_PASS`).

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::gate::DEFAULT_THRESHOLD;
use crate::ingest::config::{SourceConfig, DEFAULT_USER_AGENT};
use crate::question::QuestionType;
use crate::summarize::{DEFAULT_MAX_SENTENCES, DEFAULT_MIN_SENTENCES};

pub const CONFIG_ENV: &str = "NEWSBOT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/newsbot.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Snapshots, delivery results and metrics land here.
    pub output_dir: PathBuf,
    pub ingest: IngestConfig,
    pub sources: Vec<SourceConfig>,
    pub summarizer: SummarizerConfig,
    pub questions: QuestionConfig,
    pub gate: GateConfig,
    pub distribution: DistributionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            ingest: IngestConfig::default(),
            sources: SourceConfig::default_set(),
            summarizer: SummarizerConfig::default(),
            questions: QuestionConfig::default(),
            gate: GateConfig::default(),
            distribution: DistributionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_results_per_source: usize,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_results_per_source: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub max_sentences: usize,
    pub min_sentences: usize,
    /// Stop-word language; only "english" ships.
    pub language: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_sentences: DEFAULT_MAX_SENTENCES,
            min_sentences: DEFAULT_MIN_SENTENCES,
            language: "english".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionConfig {
    pub question_types: Vec<QuestionType>,
    /// Fixed seed for reproducible template choice; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            question_types: QuestionType::default_set(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub enabled: bool,
    pub threshold: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    pub discord_webhook: Option<String>,
    pub slack_webhook: Option<String>,
    pub email: Option<EmailConfig>,
    pub timeout_secs: u64,
    pub max_retries: u8,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            discord_webhook: None,
            slack_webhook: None,
            email: None,
            timeout_secs: 5,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_pass: Option<String>,
    pub from: String,
    pub to: String,
}

/// `"ENV"` (any case) → value of `var`.
fn resolve_secret(value: &mut Option<String>, var: &str) -> Result<()> {
    if let Some(v) = value {
        if v.trim().eq_ignore_ascii_case("env") {
            *v = env::var(var).map_err(|_| anyhow!("Missing {var} env var"))?;
        }
    }
    Ok(())
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(raw).context("parsing config toml")?;
        cfg.finish()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))?;
        tracing::info!(path = %path.display(), sources = cfg.sources.len(), "config loaded");
        Ok(cfg)
    }

    /// `NEWSBOT_CONFIG`, else `./config/newsbot.toml`, else defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&p));
        }
        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(fallback);
        }
        tracing::info!("no config file, using defaults");
        let mut cfg = Self::default();
        cfg.finish()?;
        Ok(cfg)
    }

    /// Explicit path when given, otherwise [`AppConfig::load_default`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Self::load_default(),
        }
    }

    /// Resolve secrets and sanitize values.
    fn finish(&mut self) -> Result<()> {
        let d = &mut self.distribution;
        resolve_secret(&mut d.discord_webhook, "DISCORD_WEBHOOK_URL")?;
        resolve_secret(&mut d.slack_webhook, "SLACK_WEBHOOK_URL")?;
        if let Some(email) = &mut d.email {
            resolve_secret(&mut email.smtp_user, "SMTP_USER")?;
            resolve_secret(&mut email.smtp_pass, "SMTP_PASS")?;
        }

        if !self.summarizer.language.eq_ignore_ascii_case("english") {
            bail!(
                "unsupported summarizer language {:?} (only \"english\")",
                self.summarizer.language
            );
        }
        self.summarizer.language = self.summarizer.language.to_lowercase();

        let s = &mut self.summarizer;
        s.max_sentences = s.max_sentences.max(1);
        s.min_sentences = s.min_sentences.clamp(1, s.max_sentences);

        if !self.gate.threshold.is_finite() {
            self.gate.threshold = DEFAULT_THRESHOLD;
        }
        self.gate.threshold = self.gate.threshold.clamp(-1.0, 1.0);

        if self.questions.question_types.is_empty() {
            self.questions.question_types = QuestionType::default_set();
        }
        if self.ingest.max_results_per_source == 0 {
            self.ingest.max_results_per_source = IngestConfig::default().max_results_per_source;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::config::SourceKind;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.summarizer.max_sentences, 3);
        assert_eq!(cfg.gate.threshold, -0.5);
        assert_eq!(cfg.sources.len(), 3);
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            output_dir = "out"

            [summarizer]
            max_sentences = 2

            [questions]
            question_types = ["why", "yes_no"]
            seed = 42

            [gate]
            enabled = false
            threshold = -0.25

            [[sources]]
            kind = "website"
            sites = ["https://site.test"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.summarizer.max_sentences, 2);
        assert_eq!(cfg.summarizer.min_sentences, 1);
        assert_eq!(
            cfg.questions.question_types,
            vec![QuestionType::Why, QuestionType::YesNo]
        );
        assert_eq!(cfg.questions.seed, Some(42));
        assert!(!cfg.gate.enabled);
        assert_eq!(cfg.gate.threshold, -0.25);
        assert_eq!(cfg.sources.len(), 1);
        assert_eq!(cfg.sources[0].kind(), SourceKind::Website);
    }

    #[test]
    fn values_are_sanitized() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [summarizer]
            max_sentences = 0
            min_sentences = 9

            [gate]
            threshold = -3.0

            [questions]
            question_types = []
            "#,
        )
        .unwrap();
        assert_eq!(cfg.summarizer.max_sentences, 1);
        assert_eq!(cfg.summarizer.min_sentences, 1);
        assert_eq!(cfg.gate.threshold, -1.0);
        assert_eq!(cfg.questions.question_types, QuestionType::default_set());
    }

    #[test]
    fn unsupported_language_is_an_error() {
        let err = AppConfig::from_toml_str("[summarizer]\nlanguage = \"klingon\"").unwrap_err();
        assert!(format!("{err:#}").contains("klingon"));
    }
}
