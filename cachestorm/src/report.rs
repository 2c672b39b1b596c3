use anyhow::Context as _;
use serde::Serialize;
use std::path::Path;
use std::time::SystemTime;

use cachestorm_core::runner::{RunConfig, RunSummary};
use cachestorm_core::{MetricsDelta, ServerMetricsSnapshot};

/// Everything one run produced: what was asked, what happened, and how the server moved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunReport {
    /// RFC 3339, UTC, second precision.
    pub generated_at: String,
    pub target: String,
    pub config: RunConfig,
    pub result: RunSummary,
    pub before: ServerMetricsSnapshot,
    pub after: ServerMetricsSnapshot,
    pub delta: MetricsDelta,
}

impl RunReport {
    pub(crate) fn new(
        target: String,
        config: RunConfig,
        result: RunSummary,
        before: ServerMetricsSnapshot,
        after: ServerMetricsSnapshot,
        delta: MetricsDelta,
    ) -> Self {
        Self {
            generated_at: humantime::format_rfc3339_seconds(SystemTime::now()).to_string(),
            target,
            config,
            result,
            before,
            after,
            delta,
        }
    }
}

pub(crate) async fn write_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(report).context("failed to serialize report")?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create report directory: {}", parent.display()))?;
    }

    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write report: {}", path.display()))?;

    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
