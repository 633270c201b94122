//! Costura entre o gateway e o store key-value.
//!
//! Um `KvStore` entrega sessões; cada operação do gateway adquire uma,
//! usa e solta no fim do escopo, em qualquer caminho de saída.

mod memory;
mod resp;

use async_trait::async_trait;
use bytes::Bytes;

use ttlpaste_common::StoreResult;
use ttlpaste_storage::{TTL_MISSING, TTL_PERSISTENT};

pub use memory::MemoryStore;

/// Estado de expiração de uma chave, na semântica do comando TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// A chave não existe.
    Missing,
    /// A chave existe e não tem expiração.
    Persistent,
    /// Segundos restantes; zero ou negativo significa que já venceu.
    Seconds(i64),
}

impl From<i64> for Ttl {
    fn from(raw: i64) -> Self {
        match raw {
            TTL_MISSING => Ttl::Missing,
            TTL_PERSISTENT => Ttl::Persistent,
            secs => Ttl::Seconds(secs),
        }
    }
}

#[async_trait]
pub trait KvSession: Send {
    /// Grava uma chave nova com expiração. `false` se a chave já existia.
    async fn set_ex(&mut self, key: &str, value: Bytes, ttl_secs: u64) -> StoreResult<bool>;

    async fn get(&mut self, key: &str) -> StoreResult<Option<Bytes>>;

    async fn ttl(&mut self, key: &str) -> StoreResult<Ttl>;

    /// `true` se a chave existia e foi removida por esta chamada.
    async fn del(&mut self, key: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Nome curto do backend, usado em logs e no /health.
    fn name(&self) -> &'static str;

    /// Falhas aqui são sempre `StoreError::Unavailable`.
    async fn acquire(&self) -> StoreResult<Box<dyn KvSession>>;
}
