use anyhow::Context as _;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use cachestorm_core::runner::RunConfig;

use crate::cli::RunArgs;

pub(crate) const DEFAULT_TARGET: &str = "redis://127.0.0.1:6379";
pub(crate) const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(1);

/// Run settings read from `--config`. Every field is optional; flags win.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ConfigFile {
    pub target: Option<String>,
    pub threads: Option<u64>,
    #[serde(alias = "requestsPerThread")]
    pub requests: Option<u64>,
    pub duration: Option<YamlDuration>,
    pub payload_size: Option<usize>,
    pub read_ratio: Option<f64>,
    pub aggressive: Option<bool>,
    pub key_prefix: Option<String>,
    pub key_tag: Option<String>,
    pub seed: Option<u64>,
    pub op_timeout: Option<YamlDuration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct YamlDuration(Duration);

impl YamlDuration {
    fn into_inner(self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for YamlDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl serde::de::Visitor<'_> for V {
            type Value = YamlDuration;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("duration as string (e.g. 10s) or integer seconds")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(YamlDuration(Duration::from_secs(v)))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(|v| YamlDuration(Duration::from_secs(v)))
                    .map_err(|_| E::custom("duration must not be negative"))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let d = humantime::parse_duration(v).map_err(E::custom)?;
                Ok(YamlDuration(d))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_str(&v)
            }
        }

        deserializer.deserialize_any(V)
    }
}

pub(crate) async fn load_config_file(path: &Path) -> anyhow::Result<ConfigFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    serde_yaml::from_slice(&bytes)
        .with_context(|| format!("failed to parse YAML: {}", path.display()))
}

/// Effective settings of one invocation.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub target: String,
    pub password: Option<String>,
    pub op_timeout: Duration,
    pub run: RunConfig,
}

/// Merges flags over the config file over built-in defaults.
pub(crate) fn resolve_settings(args: &RunArgs, file: ConfigFile) -> anyhow::Result<Settings> {
    let defaults = RunConfig::default();

    let duration_secs = match (args.duration, file.duration) {
        (Some(secs), _) => secs,
        (None, Some(d)) => whole_secs(d.into_inner())?,
        (None, None) => defaults.duration_secs,
    };

    let read_ratio = args
        .read_ratio
        .or(file.read_ratio)
        .unwrap_or(defaults.read_ratio);
    if !(0.0..=1.0).contains(&read_ratio) {
        anyhow::bail!("readRatio {read_ratio} is out of range (expected 0..=1)");
    }

    let op_timeout = args
        .op_timeout
        .or(file.op_timeout.map(YamlDuration::into_inner))
        .unwrap_or(DEFAULT_OP_TIMEOUT);
    if op_timeout.is_zero() {
        anyhow::bail!("opTimeout must be greater than zero");
    }

    let run = RunConfig {
        threads: args.threads.or(file.threads).unwrap_or(defaults.threads),
        requests_per_thread: args
            .requests
            .or(file.requests)
            .unwrap_or(defaults.requests_per_thread),
        duration_secs,
        payload_size: args
            .payload_size
            .or(file.payload_size)
            .unwrap_or(defaults.payload_size),
        read_ratio,
        aggressive: args.aggressive || file.aggressive.unwrap_or(defaults.aggressive),
        key_prefix: args
            .key_prefix
            .clone()
            .or(file.key_prefix)
            .unwrap_or(defaults.key_prefix),
        key_tag: args.key_tag.clone().or(file.key_tag),
        seed: args.seed.or(file.seed),
    };

    Ok(Settings {
        target: args
            .target
            .clone()
            .or(file.target)
            .unwrap_or_else(|| DEFAULT_TARGET.to_string()),
        password: args.password.clone(),
        op_timeout,
        run,
    })
}

fn whole_secs(d: Duration) -> anyhow::Result<u64> {
    if d.subsec_nanos() != 0 {
        anyhow::bail!(
            "duration {} must be a whole number of seconds",
            humantime::format_duration(d)
        );
    }
    Ok(d.as_secs())
}
