#![forbid(unsafe_code)]

mod config;
mod dial;
mod pool;

pub use config::ClientConfig;
pub use pool::{Pool, PooledConnection};
