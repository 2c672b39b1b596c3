mod config;
mod error;
mod gate;
mod keys;
mod mode;
mod percentile;
mod progress;
mod run;
mod selector;
mod stats;
mod worker;

pub use config::{
    DEFAULT_KEY_PREFIX, DEFAULT_PAYLOAD_SIZE, DEFAULT_READ_RATIO, JITTER_MAX, JITTER_PROBABILITY,
    MAX_THREADS, RunConfig,
};
pub use error::{Error, Result};
pub use gate::IterationGate;
pub use keys::KeyBuilder;
pub use mode::{ExecutionMode, resolve_mode};
pub use percentile::percentile;
pub use progress::{ProgressFn, ProgressUpdate};
pub use run::run_workload;
pub use selector::{AGGRESSIVE_DELETE_RATIO, OperationKind, select_operation};
pub use stats::{OperationOutcome, RunStats, RunSummary};
pub use worker::StopSignal;
