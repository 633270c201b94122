#![forbid(unsafe_code)]

mod command;
mod connection;
mod frame;
mod parse;

pub use command::{Command, SetCondition, SetOptions};
pub use connection::Connection;
pub use frame::Frame;
pub use parse::Parse;
