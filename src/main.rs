//! newsbot: one ingest → summarize → ask → distribute run for a topic.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsbot::config::AppConfig;
use newsbot::pipeline::{NewsBot, RunReport};
use newsbot::telemetry::Metrics;

#[derive(Debug, Parser)]
#[command(name = "newsbot", version, about = "Topical news summaries with a discussion question")]
struct Cli {
    /// Topic to search for, e.g. "climate change".
    #[arg(short, long)]
    topic: String,

    /// Config file (defaults: $NEWSBOT_CONFIG, then config/newsbot.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overrides RUST_LOG (e.g. "debug" or "ingest=debug,info").
    #[arg(long)]
    log_level: Option<String>,

    /// Run everything except distribution.
    #[arg(long)]
    dry_run: bool,
}

/// `--log-level`, else `RUST_LOG`, else `info`. JSON lines when
/// `NEWSBOT_LOG_FORMAT=json`.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::new(l),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let json = std::env::var("NEWSBOT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn print_report(r: &RunReport) {
    println!(
        "topic: {} | candidates: {} | duplicates: {} | kept: {} | rejected: {} | failed: {}",
        r.topic,
        r.candidates,
        r.duplicates,
        r.items.len(),
        r.rejected.len(),
        r.failed
    );
    for e in &r.adapter_errors {
        println!("adapter {} failed: {}", e.adapter, e.message);
    }
    for (i, item) in r.items.iter().enumerate() {
        println!("\n[{}] {} ({})", i + 1, item.title, item.source);
        println!("    {}", item.url);
        println!("    summary:  {}", item.summary);
        println!("    question: {}", item.question);
        if let Some(img) = &item.rendered_image_path {
            println!("    image:    {img}");
        }
    }
    for d in &r.deliveries {
        let status = if d.success { "ok" } else { "FAILED" };
        println!("delivery {} {} {}: {}", d.target, d.url, status, d.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let cfg = AppConfig::load(cli.config.as_deref())?;
    let bot = NewsBot::from_config(&cfg)?.dry_run(cli.dry_run);
    let report = bot.run(&cli.topic).await?;
    print_report(&report);

    if let Some(m) = metrics {
        m.write_textfile(&cfg.output_dir.join("metrics.prom"))?;
    }
    Ok(())
}
