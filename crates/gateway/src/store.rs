use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{KvStore, Ttl};
use crate::{GatewayError, Locator, NewPaste, PasteRecord};

const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Resposta de um Create bem-sucedido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPaste {
    pub locator: Locator,
    pub file_url: String,
    pub expiry_time: String,
}

/// Store Gateway: traduz create/read/delete em chamadas ao backend.
#[derive(Clone)]
pub struct PasteStore {
    backend: Arc<dyn KvStore>,
    base_url: String,
}

impl PasteStore {
    pub fn new(backend: Arc<dyn KvStore>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { backend, base_url }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Grava o paste com TTL e só retorna depois do backend confirmar.
    pub async fn create(&self, paste: NewPaste) -> Result<CreatedPaste, GatewayError> {
        let mut session = self.backend.acquire().await?;

        let locator = Locator::new(paste.language.clone(), Uuid::new_v4().simple().to_string());
        let expiry_time = format_expiry(Utc::now(), paste.expiry.minutes());
        let record = PasteRecord {
            title: paste.title,
            code: paste.code,
            language: paste.language,
            expiry_time,
        };
        let payload = serde_json::to_vec(&record)
            .map_err(|e| GatewayError::BackendOperationFailed(e.to_string()))?;

        let key = locator.storage_key();
        let written = session
            .set_ex(&key, Bytes::from(payload), paste.expiry.ttl_secs())
            .await?;
        if !written {
            return Err(GatewayError::BackendOperationFailed(format!(
                "chave {key} já existia"
            )));
        }

        info!(
            "paste criado: {locator} (expira em {} min)",
            paste.expiry.minutes()
        );
        Ok(CreatedPaste {
            file_url: format!("{}{}", self.base_url, locator.path()),
            locator,
            expiry_time: record.expiry_time,
        })
    }

    /// Lê o paste. O TTL decide primeiro: chave ausente é `NotFound`,
    /// chave sem expiração ou com TTL não positivo é `Expired`.
    pub async fn read(&self, file_id: &str) -> Result<PasteRecord, GatewayError> {
        let locator = Locator::parse(file_id)?;
        let key = locator.storage_key();
        let mut session = self.backend.acquire().await?;

        let value = session.get(&key).await?;
        let ttl = session.ttl(&key).await?;

        match ttl {
            Ttl::Missing => Err(GatewayError::NotFound),
            Ttl::Persistent => Err(GatewayError::Expired),
            Ttl::Seconds(secs) if secs <= 0 => Err(GatewayError::Expired),
            Ttl::Seconds(_) => {
                let Some(value) = value else {
                    return Err(GatewayError::NotFound);
                };
                serde_json::from_slice(&value).map_err(|e| {
                    GatewayError::BackendOperationFailed(format!("registro ilegível em {key}: {e}"))
                })
            }
        }
    }

    /// Remove o paste. Só a chamada que de fato apagou a chave recebe Ok.
    pub async fn delete(&self, file_id: &str) -> Result<(), GatewayError> {
        let locator = Locator::parse(file_id)?;
        let key = locator.storage_key();
        let mut session = self.backend.acquire().await?;

        if session.get(&key).await?.is_none() {
            return Err(GatewayError::NotFound);
        }
        if !session.del(&key).await? {
            debug!("{key} sumiu entre GET e DEL");
            return Err(GatewayError::NotFound);
        }

        info!("paste removido: {locator}");
        Ok(())
    }

    /// Confirma que uma sessão com o backend pode ser aberta.
    pub async fn health(&self) -> Result<(), GatewayError> {
        self.backend.acquire().await?;
        Ok(())
    }
}

fn format_expiry(now: DateTime<Utc>, minutes: u32) -> String {
    (now + TimeDelta::minutes(i64::from(minutes)))
        .format(EXPIRY_FORMAT)
        .to_string()
}
