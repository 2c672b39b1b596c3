#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// The run completed. Failed operations are part of the result, not a failure.
    Success = 0,

    /// Invalid CLI/config input (bad flags, malformed YAML, undefined execution mode, etc.).
    InvalidInput = 30,

    /// Internal/runtime error (unreachable target, IO errors, worker panics).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
