use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;

use super::config::RunConfig;
use super::error::{Error, Result};
use super::gate::IterationGate;
use super::keys::KeyBuilder;
use super::progress::{ProgressFn, ProgressUpdate};
use super::stats::{RunStats, RunSummary};
use super::worker::{StopSignal, WorkerContext, run_worker};
use crate::cache::CacheClient;
use crate::random::RandomSourceFactory;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);
const MAX_HANDLE_PREALLOC: u64 = 1024;

/// Runs one workload against `cache` and returns its summary.
///
/// Spawns `config.threads` worker tasks, each with its own random source from `sources`.
/// Time-bounded runs fire a shared stop signal after `config.duration_secs`; workers observe
/// it between operations. Returns once every worker has stopped.
///
/// Fails with [`Error::UndefinedMode`] or [`Error::TooManyThreads`] before spawning anything
/// when the configuration is not executable. Individual operation failures are only counted.
pub async fn run_workload<C, F>(
    config: &RunConfig,
    cache: Arc<C>,
    sources: &F,
    progress: Option<ProgressFn>,
) -> Result<RunSummary>
where
    C: CacheClient + ?Sized + 'static,
    F: RandomSourceFactory,
{
    let mode = config.validate()?;

    let duration = config.duration();
    let requests = config.requests_bound();
    tracing::info!(
        %mode,
        threads = config.threads,
        requests_per_thread = config.requests_per_thread,
        duration_secs = config.duration_secs,
        aggressive = config.aggressive,
        "starting workload"
    );

    let stats = Arc::new(RunStats::default());
    let stop = Arc::new(StopSignal::new());
    let keys = Arc::new(KeyBuilder::new(
        &config.key_prefix,
        config.key_tag.as_deref(),
    ));

    let started = Instant::now();

    let timer_handle = duration.map(|d| {
        let stop = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(d).await;
            tracing::debug!("duration elapsed; stopping workers");
            stop.fire();
        })
    });

    let deadline = duration.map(|d| started + d);

    let mut handles = Vec::with_capacity(
        usize::try_from(config.threads.min(MAX_HANDLE_PREALLOC)).unwrap_or_default(),
    );
    for worker_id in 0..config.threads {
        let ctx = WorkerContext {
            worker_id,
            cache: cache.clone(),
            stats: stats.clone(),
            gate: IterationGate::new(requests, deadline, stop.clone()),
            keys: keys.clone(),
            payload_size: config.payload_size,
            read_ratio: config.read_ratio,
            aggressive: config.aggressive,
        };
        let rng = sources.source_for(worker_id);
        handles.push(tokio::spawn(run_worker(ctx, rng)));
    }

    let progress_handle = progress.map(|progress| {
        let stats = stats.clone();
        let planned_total = requests.map(|r| r.saturating_mul(config.threads));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick is immediate; skip it so the first rate isn't computed over ~0s.
            interval.tick().await;

            let mut tick: u64 = 0;
            let mut last_at = Instant::now();
            let mut last_total: u64 = 0;

            loop {
                interval.tick().await;

                tick = tick.saturating_add(1);
                let now = Instant::now();
                let dt = now.duration_since(last_at);
                last_at = now;

                let total = stats.total();
                let delta = total.saturating_sub(last_total);
                last_total = total;

                (progress)(ProgressUpdate {
                    tick,
                    interval: dt,
                    elapsed: started.elapsed(),
                    mode,
                    duration,
                    planned_total,
                    total,
                    success: stats.success(),
                    timeouts: stats.timeouts(),
                    errors: stats.errors(),
                    ops_per_sec_now: delta as f64 / dt.as_secs_f64().max(1e-9),
                });
            }
        })
    });

    let mut join_error = None;
    for h in handles {
        if let Err(err) = h.await {
            // Wind the other workers down before surfacing the failure.
            stop.fire();
            join_error.get_or_insert(err);
        }
    }
    let elapsed = started.elapsed();

    if let Some(h) = timer_handle {
        h.abort();
    }
    if let Some(h) = progress_handle {
        h.abort();
        let _ = h.await;
    }

    if let Some(err) = join_error {
        return Err(Error::Join(err));
    }

    let summary = stats.summarize(mode, elapsed);
    tracing::info!(
        total = summary.total,
        success = summary.success,
        timeouts = summary.timeouts,
        errors = summary.errors,
        elapsed_ms = summary.elapsed_ms,
        throughput = summary.throughput,
        "workload finished"
    );

    Ok(summary)
}
