use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub(crate) struct HumanProgress {
    inner: Mutex<Option<RunProgressBar>>,
}

impl HumanProgress {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// `length` is `None` for open-ended runs, which get a spinner instead of a bar.
    pub(crate) fn update(&self, length: Option<u64>, position: u64, message: String) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let desired_kind = if length.is_some() {
            ProgressBarKind::Bar
        } else {
            ProgressBarKind::Spinner
        };

        if inner.as_ref().is_some_and(|b| b.kind != desired_kind)
            && let Some(old) = inner.take()
        {
            old.pb.finish_and_clear();
        }

        let bar = inner.get_or_insert_with(|| RunProgressBar::new(desired_kind));
        bar.pb.set_message(message);

        match length {
            Some(len) => {
                bar.pb.set_length(len);
                bar.pb.set_position(position.min(len));
            }
            None => bar.pb.tick(),
        }
    }

    pub(crate) fn finish(&self) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(b) = inner.take() {
            b.pb.finish_and_clear();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgressBarKind {
    Spinner,
    Bar,
}

struct RunProgressBar {
    kind: ProgressBarKind,
    pb: ProgressBar,
}

impl RunProgressBar {
    fn new(kind: ProgressBarKind) -> Self {
        let pb = match kind {
            ProgressBarKind::Bar => {
                let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr_with_hz(5));
                pb.set_style(bar_style());
                pb
            }
            ProgressBarKind::Spinner => {
                let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr_with_hz(5));
                pb.set_style(spinner_style());
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            }
        };
        pb.set_prefix("run");
        Self { kind, pb }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} [ {bar:20.cyan/blue} ] {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} {spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
