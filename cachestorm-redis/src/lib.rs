#![forbid(unsafe_code)]

mod client;
mod error;
mod info;
mod target;

pub use client::{DEFAULT_CONNECT_TIMEOUT, RedisCache};
pub use error::{Error, Result};
pub use info::{RedisInfoProvider, parse_info};
pub use target::{redact_target, with_password};
