#![forbid(unsafe_code)]

mod db;
mod entry;

pub use db::{Db, TTL_MISSING, TTL_PERSISTENT};
