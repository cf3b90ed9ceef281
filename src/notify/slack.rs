// src/notify/slack.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{DistributionPayload, Distributor};

pub struct SlackDistributor {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackDistributor {
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Slack mrkdwn: bold title, summary, italic question, link.
fn message_text(p: &DistributionPayload) -> String {
    let mut text = format!("*{}*", p.title);
    if !p.summary.is_empty() {
        text.push('\n');
        text.push_str(&p.summary);
    }
    text.push_str(&format!("\n_{}_\n<{}>", p.question, p.url));
    text
}

#[async_trait]
impl Distributor for SlackDistributor {
    fn target(&self) -> &str {
        "slack"
    }

    async fn deliver(&self, payload: &DistributionPayload) -> Result<()> {
        let body = serde_json::json!({ "text": message_text(payload) });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }
}
