use std::sync::Arc;

mod format;
mod progress;
mod summary;

use format::{format_ms, format_rate};
use progress::HumanProgress;
use summary::render;

use super::OutputFormatter;
use crate::config_file::Settings;
use crate::report::RunReport;

pub(crate) struct HumanReadableOutput {
    progress: Arc<HumanProgress>,
}

impl HumanReadableOutput {
    pub(crate) fn new() -> Self {
        Self {
            progress: Arc::new(HumanProgress::new()),
        }
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn print_header(&self, target: &str, settings: &Settings) {
        let run = &settings.run;
        println!("target: {target}");
        println!(
            "mode: {} threads={} requests={} duration={}s payload={}B read_ratio={} aggressive={}",
            run.mode(),
            run.threads,
            run.requests_per_thread,
            run.duration_secs,
            run.payload_size,
            run.read_ratio,
            run.aggressive
        );
        println!();
    }

    fn progress(&self) -> Option<cachestorm_core::runner::ProgressFn> {
        let progress = self.progress.clone();

        Some(Arc::new(move |u| {
            let failed = u.timeouts.saturating_add(u.errors);
            let mut message = format!(
                "ops/s={} total={} failed={failed}",
                format_rate(u.ops_per_sec_now),
                u.total
            );
            if let Some(planned) = u.planned_total {
                message.push_str(&format!(" planned={planned}"));
            }
            message.push_str(&format!(
                " elapsed={}",
                format_ms(u.elapsed.as_secs_f64() * 1000.0)
            ));

            // Timed runs fill the bar by time, request-bounded ones by operations.
            let (length, position) = match (u.duration, u.planned_total) {
                (Some(d), _) => (
                    Some(d.as_millis() as u64),
                    u.elapsed.as_millis() as u64,
                ),
                (None, Some(planned)) => (Some(planned), u.total),
                (None, None) => (None, 0),
            };

            progress.update(length, position, message);
        }))
    }

    fn print_summary(&self, report: &RunReport) -> anyhow::Result<()> {
        self.progress.finish();
        print!("{}", render(report));
        Ok(())
    }
}
