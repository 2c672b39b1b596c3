use anyhow::Context as _;
use std::sync::Arc;
use std::time::Duration;

use cachestorm_core::{CacheClient, FaultPlan, MemoryCache, SnapshotProvider};
use cachestorm_redis::{RedisCache, redact_target, with_password};

use crate::cli::parse_duration;
use crate::config_file::Settings;
use crate::run_error::RunError;

/// Capabilities a run needs from its target.
pub(crate) struct Backend {
    pub cache: Arc<dyn CacheClient>,
    pub metrics: Arc<dyn SnapshotProvider>,
    /// Target rendered for display, with credentials masked.
    pub display: String,
}

/// Opens the backend named by the target's scheme.
///
/// Unknown schemes and malformed targets are invalid input; an unreachable server is a
/// runtime error.
pub(crate) async fn connect(settings: &Settings) -> Result<Backend, RunError> {
    let target = settings.target.trim();
    let scheme = target
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .ok_or_else(|| {
            RunError::InvalidInput(anyhow::anyhow!(
                "invalid target '{}' (expected redis://host:port or memory://)",
                redact_target(target)
            ))
        })?;

    match scheme.as_str() {
        "memory" => {
            let faults = memory_faults(target).map_err(RunError::InvalidInput)?;
            let cache = Arc::new(MemoryCache::with_faults(faults));
            tracing::debug!(?faults, "using in-process cache");
            Ok(Backend {
                cache: cache.clone(),
                metrics: cache,
                display: target.to_string(),
            })
        }
        "redis" => {
            let url = with_password(target, settings.password.as_deref())
                .map_err(|e| RunError::InvalidInput(anyhow::Error::new(e)))?;
            let display = redact_target(&url);
            let cache = RedisCache::connect(&url, settings.op_timeout)
                .await
                .with_context(|| format!("failed to open {display}"))
                .map_err(RunError::RuntimeError)?;
            let metrics = Arc::new(cache.info_provider());
            Ok(Backend {
                cache: Arc::new(cache),
                metrics,
                display,
            })
        }
        other => Err(RunError::InvalidInput(anyhow::anyhow!(
            "unsupported target scheme '{other}' (expected redis:// or memory://)"
        ))),
    }
}

/// Reads fault injection from `memory://?latency=1ms&timeoutEvery=10&errorEvery=7`.
fn memory_faults(target: &str) -> anyhow::Result<FaultPlan> {
    let url = url::Url::parse(target).with_context(|| format!("invalid target '{target}'"))?;
    let mut faults = FaultPlan::default();

    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "latency" => {
                faults.latency = Some(parse_duration(&value).map_err(|e| anyhow::anyhow!(e))?);
            }
            "timeoutEvery" => faults.timeout_every = Some(parse_every(&name, &value)?),
            "errorEvery" => faults.error_every = Some(parse_every(&name, &value)?),
            other => anyhow::bail!("unknown memory:// option '{other}'"),
        }
    }

    if faults.latency.is_some_and(|d| d > Duration::from_secs(1)) {
        anyhow::bail!("memory:// latency must not exceed 1s");
    }
    Ok(faults)
}

fn parse_every(name: &str, value: &str) -> anyhow::Result<u64> {
    let n: u64 = value
        .parse()
        .with_context(|| format!("invalid memory:// option {name}={value}"))?;
    if n == 0 {
        anyhow::bail!("memory:// option {name} must be greater than zero");
    }
    Ok(n)
}
