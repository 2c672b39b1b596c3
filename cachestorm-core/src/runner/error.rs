pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "undefined execution mode (threads={threads}, requests_per_thread={requests_per_thread}, duration_secs={duration_secs}): `threads` must be positive and at least one of `requests_per_thread`/`duration_secs` must be set"
    )]
    UndefinedMode {
        threads: u64,
        requests_per_thread: u64,
        duration_secs: u64,
    },

    #[error("too many threads: {threads} (at most {max})")]
    TooManyThreads { threads: u64, max: u64 },

    #[error("worker task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
