#![forbid(unsafe_code)]

pub mod handler;
mod server;

pub use handler::{Session, handle_connection};
pub use server::{ServerConfig, run};
