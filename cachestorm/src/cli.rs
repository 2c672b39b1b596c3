use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

const DURATION_HINT: &str = "expected e.g. 10s, 250ms, 1m";

pub(crate) fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err(format!("duration cannot be empty ({DURATION_HINT})"));
    }

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);

    if number_end == 0 {
        return Err(format!("invalid duration '{s}' ({DURATION_HINT})"));
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str
        .parse()
        .map_err(|_| format!("invalid duration '{s}' ({DURATION_HINT})"))?;

    match unit_str.trim() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => Ok(Duration::from_secs(value)),
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => {
            Ok(Duration::from_millis(value))
        }
        "m" | "min" | "mins" | "minute" | "minutes" => {
            let secs = value
                .checked_mul(60)
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Ok(Duration::from_secs(secs))
        }
        "h" | "hr" | "hrs" | "hour" | "hours" => {
            let secs = value
                .checked_mul(60 * 60)
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Ok(Duration::from_secs(secs))
        }
        _ => Err(format!("invalid duration '{s}' ({DURATION_HINT})")),
    }
}

/// Run length in whole seconds; the engine has no sub-second bound.
fn parse_run_duration(input: &str) -> Result<u64, String> {
    let d = parse_duration(input)?;
    if d.subsec_nanos() != 0 {
        return Err(format!(
            "run duration '{}' must be a whole number of seconds",
            input.trim()
        ));
    }
    Ok(d.as_secs())
}

fn parse_op_timeout(input: &str) -> Result<Duration, String> {
    let d = parse_duration(input)?;
    if d.is_zero() {
        return Err("operation timeout must be greater than zero".to_string());
    }
    Ok(d)
}

pub(crate) fn parse_ratio(input: &str) -> Result<f64, String> {
    let v: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid ratio '{input}' (expected a number in 0..=1)"))?;
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("ratio {v} is out of range (expected 0..=1)"));
    }
    Ok(v)
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Progress bar and human-readable summary.
    HumanReadable,
    /// Emit JSON progress and summary lines (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "cachestorm",
    author,
    version,
    about = "Load and stress generator for key-value caches",
    long_about = "cachestorm drives concurrent GET/SET/DEL traffic against a cache and reports latency percentiles, throughput, and how the server's own metrics moved during the run.\n\nA run is bounded by a per-worker request count, a duration, or both (whichever ends first).",
    after_help = "Examples:\n  cachestorm run --target redis://127.0.0.1:6379 --threads 8 --requests 10000\n  cachestorm run --threads 16 --duration 30s --aggressive\n  cachestorm run --config load.yaml --output json --report out/report.json\n\nDocs: https://github.com/nogcio/cachestorm"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a workload against a cache
    #[command(
        long_about = "Run a workload against a cache.\n\nFlags (and their environment variables) override values from --config, which override built-in defaults."
    )]
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Cache to load (redis://[user[:password]@]host[:port][/db] or memory://)
    #[arg(long, env = "CACHESTORM_TARGET")]
    pub target: Option<String>,

    /// Password for the target; used when the URL carries none
    #[arg(long, env = "CACHESTORM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// YAML file with run settings
    #[arg(long, env = "CACHESTORM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of concurrent workers (default 1)
    #[arg(long, env = "CACHESTORM_THREADS")]
    pub threads: Option<u64>,

    /// Operations per worker; 0 means unbounded
    #[arg(long, env = "CACHESTORM_REQUESTS")]
    pub requests: Option<u64>,

    /// Run length in whole seconds (e.g. 30s, 1m); 0 means unbounded
    #[arg(long, env = "CACHESTORM_DURATION", value_parser = parse_run_duration)]
    pub duration: Option<u64>,

    /// Size in bytes of written values (default 256)
    #[arg(long, env = "CACHESTORM_PAYLOAD_SIZE")]
    pub payload_size: Option<usize>,

    /// Fraction of operations that are reads (default 0.8)
    #[arg(long, env = "CACHESTORM_READ_RATIO", value_parser = parse_ratio)]
    pub read_ratio: Option<f64>,

    /// Mix in deletes and random pauses between operations
    #[arg(long, env = "CACHESTORM_AGGRESSIVE")]
    pub aggressive: bool,

    /// Key namespace (default "cachestorm")
    #[arg(long, env = "CACHESTORM_KEY_PREFIX")]
    pub key_prefix: Option<String>,

    /// Extra key segment, e.g. to separate concurrent runs
    #[arg(long, env = "CACHESTORM_KEY_TAG")]
    pub key_tag: Option<String>,

    /// Seed for reproducible operation mixes and payloads
    #[arg(long, env = "CACHESTORM_SEED")]
    pub seed: Option<u64>,

    /// Per-operation timeout (default 1s)
    #[arg(long, env = "CACHESTORM_OP_TIMEOUT", value_parser = parse_op_timeout)]
    pub op_timeout: Option<Duration>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,

    /// Write a JSON report (config, result, server metrics) to this path
    #[arg(long, env = "CACHESTORM_REPORT")]
    pub report: Option<PathBuf>,

    /// Log filter directive (e.g. debug, cachestorm_core=trace); defaults to RUST_LOG or warn
    #[arg(long, env = "CACHESTORM_LOG")]
    pub log_level: Option<String>,
}
