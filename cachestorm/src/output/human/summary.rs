use std::fmt::Write as _;

use super::format::{format_ms, format_rate, format_signed};
use crate::report::RunReport;

pub(crate) fn render(report: &RunReport) -> String {
    let r = &report.result;
    let mut out = String::new();

    out.push_str("summary\n");
    writeln!(&mut out, "  mode: {}", r.mode).ok();
    writeln!(
        &mut out,
        "  operations: {} (success {}, timeouts {}, errors {})",
        r.total, r.success, r.timeouts, r.errors
    )
    .ok();
    writeln!(
        &mut out,
        "  mix: reads {} writes {} deletes {}",
        r.reads, r.writes, r.deletes
    )
    .ok();

    if r.latency_samples > 0 {
        writeln!(
            &mut out,
            "  latency = avg={} p50={} p95={} p99={} min={} max={} (n={})",
            format_ms(r.latency_avg_ms),
            format_ms(r.latency_p50_ms),
            format_ms(r.latency_p95_ms),
            format_ms(r.latency_p99_ms),
            format_ms(r.latency_min_ms),
            format_ms(r.latency_max_ms),
            r.latency_samples
        )
        .ok();
    } else {
        out.push_str("  latency: n/a\n");
    }

    writeln!(
        &mut out,
        "  throughput: {} ops/s over {}",
        format_rate(r.throughput),
        format_ms(r.elapsed_ms)
    )
    .ok();

    let d = &report.delta;
    out.push_str("\nserver\n");
    writeln!(
        &mut out,
        "  memory: {} ({:.2}MiB -> {:.2}MiB)",
        format_signed(d.memory_delta_mb, "MiB"),
        report.before.used_memory_mb,
        report.after.used_memory_mb
    )
    .ok();
    writeln!(&mut out, "  evicted: {:+}", d.evicted_delta).ok();
    writeln!(&mut out, "  clients: {}", d.connected_clients).ok();
    writeln!(&mut out, "  ops/s: {}", d.ops_per_sec).ok();
    writeln!(&mut out, "  hit ratio: {:.2}%", d.hit_ratio * 100.0).ok();

    out
}
