// src/notify/mod.rs
//! Distribution of processed items to chat webhooks and email.
//!
//! Failures are per target and per item: they end up in a [`DeliveryReport`]
//! and never abort the rest of the batch.

pub mod discord;
pub mod email;
pub mod slack;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::DistributionConfig;
use crate::item::NewsItem;

pub use discord::DiscordDistributor;
pub use email::EmailDistributor;
pub use slack::SlackDistributor;

/// What a distribution target receives for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionPayload {
    pub title: String,
    pub summary: String,
    pub question: String,
    pub url: String,
    pub image_path: Option<String>,
}

impl From<&NewsItem> for DistributionPayload {
    fn from(item: &NewsItem) -> Self {
        Self {
            title: item.title.clone(),
            summary: item.summary.clone(),
            question: item.question.clone(),
            url: item.url.clone(),
            image_path: item.rendered_image_path.clone(),
        }
    }
}

impl DistributionPayload {
    /// Title, summary, question and link, blank-line separated. Empty parts are skipped.
    pub fn plain_text(&self) -> String {
        [&self.title, &self.summary, &self.question, &self.url]
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
pub trait Distributor: Send + Sync {
    /// Short target label used in reports ("discord", "slack", "email").
    fn target(&self) -> &str;
    async fn deliver(&self, payload: &DistributionPayload) -> Result<()>;
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub target: String,
    pub url: String,
    pub success: bool,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Fan-out over every configured target.
#[derive(Default)]
pub struct DistributorMux {
    targets: Vec<Box<dyn Distributor>>,
}

impl DistributorMux {
    pub fn new(targets: Vec<Box<dyn Distributor>>) -> Self {
        Self { targets }
    }

    /// Targets with a configured webhook / SMTP section. Missing ones are skipped.
    pub fn from_config(cfg: &DistributionConfig) -> Result<Self> {
        let mut targets: Vec<Box<dyn Distributor>> = Vec::new();
        if let Some(url) = cfg.discord_webhook.as_deref().filter(|u| !u.is_empty()) {
            targets.push(Box::new(
                DiscordDistributor::new(url.to_string())
                    .with_timeout(cfg.timeout_secs)
                    .with_retries(cfg.max_retries),
            ));
        }
        if let Some(url) = cfg.slack_webhook.as_deref().filter(|u| !u.is_empty()) {
            targets.push(Box::new(
                SlackDistributor::new(url.to_string()).with_timeout(cfg.timeout_secs),
            ));
        }
        if let Some(email) = &cfg.email {
            targets.push(Box::new(EmailDistributor::from_config(email)?));
        }
        Ok(Self { targets })
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.target()).collect()
    }

    /// Send every payload to every target, one report per attempt.
    pub async fn distribute(&self, payloads: &[DistributionPayload]) -> Vec<DeliveryReport> {
        let mut reports = Vec::with_capacity(payloads.len() * self.targets.len());
        for p in payloads {
            for t in &self.targets {
                let res = t.deliver(p).await;
                let (success, message) = match res {
                    Ok(()) => {
                        tracing::info!(target: "notify", to = t.target(), url = %p.url, "delivered");
                        (true, "ok".to_string())
                    }
                    Err(e) => {
                        tracing::warn!(target: "notify", to = t.target(), url = %p.url, error = ?e, "delivery failed");
                        (false, format!("{e:#}"))
                    }
                };
                reports.push(DeliveryReport {
                    target: t.target().to_string(),
                    url: p.url.clone(),
                    success,
                    message,
                    at: Utc::now(),
                });
            }
        }
        reports
    }
}

/// Write delivery results as pretty JSON.
pub fn save_delivery_reports(path: &Path, reports: &[DeliveryReport]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(reports).context("serializing delivery reports")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
