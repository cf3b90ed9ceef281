// src/notify/email.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{DistributionPayload, Distributor};
use crate::config::EmailConfig;

pub struct EmailDistributor {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailDistributor {
    pub fn from_config(cfg: &EmailConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .with_context(|| format!("invalid smtp host {}", cfg.smtp_host))?;
        if let (Some(user), Some(pass)) = (&cfg.smtp_user, &cfg.smtp_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        let mailer = builder.build();

        let from: Mailbox = cfg
            .from
            .parse()
            .with_context(|| format!("invalid sender address {}", cfg.from))?;
        let to: Mailbox = cfg
            .to
            .parse()
            .with_context(|| format!("invalid recipient address {}", cfg.to))?;

        Ok(Self { mailer, from, to })
    }
}

fn subject(p: &DistributionPayload) -> String {
    format!("News: {}", p.title)
}

fn body(p: &DistributionPayload) -> String {
    let mut out = p.plain_text();
    if let Some(img) = &p.image_path {
        out.push_str(&format!("\n\nImage: {img}"));
    }
    out.push('\n');
    out
}

#[async_trait]
impl Distributor for EmailDistributor {
    fn target(&self) -> &str {
        "email"
    }

    async fn deliver(&self, payload: &DistributionPayload) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject(payload))
            .header(header::ContentType::TEXT_PLAIN)
            .body(body(payload))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}
