use async_trait::async_trait;
use bytes::Bytes;

use ttlpaste_common::StoreResult;
use ttlpaste_protocol::SetOptions;
use ttlpaste_storage::Db;

use super::{KvSession, KvStore, Ttl};

/// Backend em processo, para `--backend memory` e testes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    db: Db,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { db: Db::new() }
    }

    /// Acesso direto ao engine, para montar fixtures.
    pub fn db(&self) -> &Db {
        &self.db
    }
}

struct MemorySession(Db);

#[async_trait]
impl KvSession for MemorySession {
    async fn set_ex(&mut self, key: &str, value: Bytes, ttl_secs: u64) -> StoreResult<bool> {
        Ok(self
            .0
            .set(key.to_string(), value, &SetOptions::create_with_ttl(ttl_secs)))
    }

    async fn get(&mut self, key: &str) -> StoreResult<Option<Bytes>> {
        Ok(self.0.get(key))
    }

    async fn ttl(&mut self, key: &str) -> StoreResult<Ttl> {
        Ok(Ttl::from(self.0.ttl(key)))
    }

    async fn del(&mut self, key: &str) -> StoreResult<bool> {
        Ok(self.0.del(&[key.to_string()]) > 0)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn acquire(&self) -> StoreResult<Box<dyn KvSession>> {
        Ok(Box::new(MemorySession(self.db.clone())))
    }
}
