use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::{Duration, Instant};
use tracing::debug;

use ttlpaste_protocol::{SetCondition, SetOptions};

use crate::entry::Entry;

/// Resposta de TTL para chave inexistente (mesmo valor do Redis).
pub const TTL_MISSING: i64 = -2;
/// Resposta de TTL para chave sem expiração.
pub const TTL_PERSISTENT: i64 = -1;

/// Item no BTreeSet de expiração: (instante, chave).
/// Ordenado por instante para purga eficiente.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct ExpiryEntry(Instant, String);

/// Estado compartilhado entre todas as conexões.
struct SharedState {
    data: DashMap<String, Entry>,
    expiry: Mutex<BTreeSet<ExpiryEntry>>,
    notify_expiry: Notify,
}

/// Handle para o store in-memory de strings com TTL.
#[derive(Clone)]
pub struct Db {
    shared: Arc<SharedState>,
}

impl Db {
    /// Cria o store e dispara a task de purga. Precisa de um runtime tokio.
    pub fn new() -> Self {
        let db = Db {
            shared: Arc::new(SharedState {
                data: DashMap::new(),
                expiry: Mutex::new(BTreeSet::new()),
                notify_expiry: Notify::new(),
            }),
        };

        let shared = db.shared.clone();
        tokio::spawn(async move {
            purge_expired_keys(shared).await;
        });

        db
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        let entry = self.shared.data.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.remove_if_expired(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Grava o valor. Retorna `false` quando a condição NX/XX não foi
    /// satisfeita; chaves expiradas contam como ausentes.
    pub fn set(&self, key: String, value: Bytes, options: &SetOptions) -> bool {
        let expires_at = options
            .expire_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let entry = Entry::new(value, expires_at);

        match self.shared.data.entry(key.clone()) {
            MapEntry::Occupied(mut occupied) => {
                let live = !occupied.get().is_expired();
                match options.condition {
                    Some(SetCondition::Nx) if live => return false,
                    Some(SetCondition::Xx) if !live => return false,
                    _ => {}
                }
                occupied.insert(entry);
            }
            MapEntry::Vacant(vacant) => {
                if options.condition == Some(SetCondition::Xx) {
                    return false;
                }
                vacant.insert(entry);
            }
        }

        if let Some(when) = expires_at {
            self.shared.expiry.lock().insert(ExpiryEntry(when, key));
            self.shared.notify_expiry.notify_one();
        }

        true
    }

    /// Segundos restantes, arredondados para o inteiro mais próximo.
    /// `TTL_MISSING` se a chave não existe, `TTL_PERSISTENT` se não expira.
    pub fn ttl(&self, key: &str) -> i64 {
        let Some(entry) = self.shared.data.get(key) else {
            return TTL_MISSING;
        };
        if entry.is_expired() {
            drop(entry);
            self.remove_if_expired(key);
            return TTL_MISSING;
        }
        match entry.remaining() {
            Some(left) => ((left.as_millis() + 500) / 1000) as i64,
            None => TTL_PERSISTENT,
        }
    }

    /// Remove as chaves vivas informadas e retorna quantas existiam.
    pub fn del(&self, keys: &[String]) -> usize {
        keys.iter()
            .filter_map(|key| self.shared.data.remove(key))
            .filter(|(_, entry)| !entry.is_expired())
            .count()
    }

    pub fn len(&self) -> usize {
        self.shared.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.data.is_empty()
    }

    fn remove_if_expired(&self, key: &str) {
        self.shared.data.remove_if(key, |_, e| e.is_expired());
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task que purga chaves expiradas.
async fn purge_expired_keys(shared: Arc<SharedState>) {
    loop {
        let next_expiry = shared.expiry.lock().first().map(|e| e.0);

        match next_expiry {
            Some(when) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(when) => {}
                    _ = shared.notify_expiry.notified() => { continue; }
                }
            }
            None => {
                shared.notify_expiry.notified().await;
                continue;
            }
        }

        let now = Instant::now();
        let mut due = Vec::new();
        {
            let mut expiry = shared.expiry.lock();
            while expiry.first().is_some_and(|e| e.0 <= now) {
                due.extend(expiry.pop_first());
            }
        }

        for ExpiryEntry(_, key) in due {
            // Só remove se realmente expirou (pode ter sido re-setado)
            if shared.data.remove_if(&key, |_, e| e.is_expired()).is_some() {
                debug!("key expirada removida: {key}");
            }
        }
    }
}
