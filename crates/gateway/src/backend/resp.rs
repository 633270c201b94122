use async_trait::async_trait;
use bytes::Bytes;

use ttlpaste_client::{Pool, PooledConnection};
use ttlpaste_common::StoreResult;
use ttlpaste_protocol::SetOptions;

use super::{KvSession, KvStore, Ttl};

#[async_trait]
impl KvSession for PooledConnection {
    async fn set_ex(&mut self, key: &str, value: Bytes, ttl_secs: u64) -> StoreResult<bool> {
        self.set(key, value, SetOptions::create_with_ttl(ttl_secs))
            .await
    }

    async fn get(&mut self, key: &str) -> StoreResult<Option<Bytes>> {
        PooledConnection::get(self, key).await
    }

    async fn ttl(&mut self, key: &str) -> StoreResult<Ttl> {
        PooledConnection::ttl(self, key).await.map(Ttl::from)
    }

    async fn del(&mut self, key: &str) -> StoreResult<bool> {
        PooledConnection::del(self, key).await.map(|n| n > 0)
    }
}

#[async_trait]
impl KvStore for Pool {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn acquire(&self) -> StoreResult<Box<dyn KvSession>> {
        let conn = Pool::acquire(self).await?;
        Ok(Box::new(conn))
    }
}
