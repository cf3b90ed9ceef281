// src/notify/discord.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{DistributionPayload, Distributor};

/// Discord caps embed descriptions at 4096 characters.
const DESCRIPTION_MAX: usize = 4096;

#[derive(Clone)]
pub struct DiscordDistributor {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl DiscordDistributor {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }
}

#[async_trait]
impl Distributor for DiscordDistributor {
    fn target(&self) -> &str {
        "discord"
    }

    async fn deliver(&self, payload: &DistributionPayload) -> Result<()> {
        let body = DiscordWebhookPayload::from_payload(payload);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await;

            let err = match res {
                Ok(rsp) => match rsp.error_for_status_ref() {
                    Ok(_) => return Ok(()),
                    Err(e) => anyhow!("Discord webhook HTTP error: {e}"),
                },
                Err(e) => anyhow!("Discord webhook request failed: {e}"),
            };
            if attempt >= self.max_retries {
                return Err(err);
            }
            tracing::debug!(target: "notify", attempt, error = %err, "discord retry");
            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
        }
    }
}

#[derive(Debug, Serialize)]
struct DiscordImage {
    url: String,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<DiscordImage>,
}

#[derive(Debug, Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn from_payload(p: &DistributionPayload) -> Self {
        let mut description = String::new();
        if !p.summary.is_empty() {
            description.push_str(&p.summary);
            description.push_str("\n\n");
        }
        description.push_str(&format!("**{}**", p.question));
        if description.chars().count() > DESCRIPTION_MAX {
            description = description.chars().take(DESCRIPTION_MAX).collect();
        }

        // embeds only render remote images
        let image = p
            .image_path
            .as_deref()
            .filter(|u| u.starts_with("http://") || u.starts_with("https://"))
            .map(|u| DiscordImage { url: u.to_string() });

        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: p.title.clone(),
                description,
                url: p.url.clone(),
                image,
            }],
        }
    }
}
