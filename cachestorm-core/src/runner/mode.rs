use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Rejection signal; never executed.
    Undefined,
    /// Per-worker request count and a duration bound, whichever ends first.
    TimedAndBounded,
    RequestsBounded,
    TimedOnly,
}

impl ExecutionMode {
    #[must_use]
    pub fn is_defined(self) -> bool {
        !matches!(self, Self::Undefined)
    }
}

#[must_use]
pub fn resolve_mode(threads: u64, requests_per_thread: u64, duration_secs: u64) -> ExecutionMode {
    if threads == 0 {
        return ExecutionMode::Undefined;
    }

    match (requests_per_thread > 0, duration_secs > 0) {
        (true, true) => ExecutionMode::TimedAndBounded,
        (true, false) => ExecutionMode::RequestsBounded,
        (false, true) => ExecutionMode::TimedOnly,
        (false, false) => ExecutionMode::Undefined,
    }
}
