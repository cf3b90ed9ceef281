// src/telemetry.rs
//! Prometheus recorder for the one-shot binary. There is no scrape endpoint;
//! the exposition is written to a textfile after each run.

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::fs;
use std::path::Path;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe_pipeline_metrics();
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Write the current exposition to `path` (textfile-collector style).
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        fs::write(path, self.render()).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "metrics written");
        Ok(())
    }
}

/// Descriptions for the gate/pipeline series (ingest describes its own).
pub fn describe_pipeline_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("gate_rejected_total", "Items dropped by the sentiment gate.");
        describe_counter!("pipeline_processed_total", "Items fully enriched.");
        describe_counter!(
            "pipeline_item_errors_total",
            "Items passed through unenriched after an error."
        );
        describe_gauge!("pipeline_last_run_ts", "Unix ts of the last finished run.");
    });
}

#[cfg(test)]
mod tests {
    use metrics::counter;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn local_recorder_renders_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            counter!("pipeline_processed_total").increment(2);
        });
        let text = handle.render();
        assert!(text.contains("pipeline_processed_total 2"), "{text}");
    }
}
