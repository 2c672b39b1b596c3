use serde::{Deserialize, Serialize};

/// Share of operations that are deletes when aggressive mode is on.
pub const AGGRESSIVE_DELETE_RATIO: f64 = 0.05;

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
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Read,
    Write,
    Delete,
}

/// Maps a uniform draw `u` in `[0, 1)` to an operation kind.
///
/// The unit interval is split into `[0, r)` reads, `[r, r + w)` writes and the remainder
/// deletes, where `r` is the clamped read ratio, `d` is [`AGGRESSIVE_DELETE_RATIO`] (or 0)
/// and `w = max(0, 1 - r - d)`. With aggressive mode off there is no delete range: any
/// draw past `r + w` (only reachable through rounding) is a write.
#[must_use]
pub fn select_operation(u: f64, read_ratio: f64, aggressive: bool) -> OperationKind {
    let r = if read_ratio.is_nan() {
        0.0
    } else {
        read_ratio.clamp(0.0, 1.0)
    };
    let d = if aggressive {
        AGGRESSIVE_DELETE_RATIO
    } else {
        0.0
    };
    let w = (1.0 - r - d).max(0.0);

    if u < r {
        OperationKind::Read
    } else if u < r + w {
        OperationKind::Write
    } else if aggressive {
        OperationKind::Delete
    } else {
        OperationKind::Write
    }
}
