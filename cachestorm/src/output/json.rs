use serde::Serialize;
use std::io::Write as _;
use std::sync::Arc;

use cachestorm_core::runner::{ExecutionMode, ProgressUpdate};
use cachestorm_core::{MetricsDelta, ServerMetricsSnapshot};

use super::OutputFormatter;
use crate::config_file::Settings;
use crate::report::RunReport;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_header(&self, _target: &str, _settings: &Settings) {}

    fn progress(&self) -> Option<cachestorm_core::runner::ProgressFn> {
        Some(Arc::new(move |u| {
            let line = build_progress_line(&u);
            emit_json_line(&line);
        }))
    }

    fn print_summary(&self, report: &RunReport) -> anyhow::Result<()> {
        let line = build_summary_line(report);
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonProgressLine {
    pub kind: &'static str,
    pub mode: ExecutionMode,
    pub elapsed_secs: u64,
    pub interval_secs: f64,

    pub ops_per_sec: f64,
    pub total: u64,
    pub planned_total: Option<u64>,
    pub success: u64,
    pub timeouts: u64,
    pub errors: u64,
}

fn build_progress_line(u: &ProgressUpdate) -> JsonProgressLine {
    JsonProgressLine {
        kind: "progress",
        mode: u.mode,
        elapsed_secs: u.elapsed.as_secs(),
        interval_secs: u.interval.as_secs_f64(),
        ops_per_sec: u.ops_per_sec_now,
        total: u.total,
        planned_total: u.planned_total,
        success: u.success,
        timeouts: u.timeouts,
        errors: u.errors,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonSummaryLine {
    pub kind: &'static str,
    pub mode: ExecutionMode,
    pub target: String,
    pub totals: JsonTotals,
    pub latency_ms: JsonLatencySummary,
    pub throughput: f64,
    pub elapsed_ms: f64,
    pub server: JsonServerMetrics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonTotals {
    pub total: u64,
    pub success: u64,
    pub timeouts: u64,
    pub errors: u64,
    pub reads: u64,
    pub writes: u64,
    pub deletes: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonLatencySummary {
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonServerMetrics {
    pub before: ServerMetricsSnapshot,
    pub after: ServerMetricsSnapshot,
    pub delta: MetricsDelta,
}

fn build_summary_line(report: &RunReport) -> JsonSummaryLine {
    let r = &report.result;

    JsonSummaryLine {
        kind: "summary",
        mode: r.mode,
        target: report.target.clone(),
        totals: JsonTotals {
            total: r.total,
            success: r.success,
            timeouts: r.timeouts,
            errors: r.errors,
            reads: r.reads,
            writes: r.writes,
            deletes: r.deletes,
        },
        latency_ms: JsonLatencySummary {
            avg: r.latency_avg_ms,
            p50: r.latency_p50_ms,
            p95: r.latency_p95_ms,
            p99: r.latency_p99_ms,
            min: r.latency_min_ms,
            max: r.latency_max_ms,
            count: r.latency_samples,
        },
        throughput: r.throughput,
        elapsed_ms: r.elapsed_ms,
        server: JsonServerMetrics {
            before: report.before,
            after: report.after,
            delta: report.delta,
        },
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}
