//! Store de pastes temporários: grava código sob uma chave com TTL num
//! backend key-value e expõe criação, leitura e remoção via HTTP.

#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
mod error;
pub mod http;
mod locator;
mod record;
mod store;

pub use error::GatewayError;
pub use locator::{Locator, storage_key};
pub use record::{ALLOWED_EXPIRY_MINUTES, ExpiryMinutes, NewPaste, PasteRecord};
pub use store::{CreatedPaste, PasteStore};
