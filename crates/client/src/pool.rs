use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use ttlpaste_common::{StoreError, StoreResult};
use ttlpaste_protocol::{Command, Connection, Frame, SetOptions};

use crate::ClientConfig;
use crate::dial::{BoxedStream, dial, tls_connector};

struct PoolInner {
    config: ClientConfig,
    tls: Option<TlsConnector>,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<Connection<BoxedStream>>>,
}

/// Pool limitado de conexões com o backend, compartilhado pelo processo.
///
/// Cada `acquire` segura uma vaga até o guard ser dropado. Conexões ociosas
/// passam por um PING antes de serem reutilizadas.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Pool {
    /// Não conecta nada ainda; a primeira conexão é aberta no primeiro `acquire`.
    pub fn new(config: ClientConfig) -> Self {
        let tls = config.tls.then(tls_connector);
        let permits = Arc::new(Semaphore::new(config.pool_size.max(1)));
        Self {
            inner: Arc::new(PoolInner {
                config,
                tls,
                permits,
                idle: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Conexões ociosas guardadas no momento.
    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().len()
    }

    pub async fn acquire(&self) -> StoreResult<PooledConnection> {
        let config = &self.inner.config;

        let permit = match timeout(
            config.connect_timeout,
            self.inner.permits.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(StoreError::Unavailable("pool fechado".into())),
            Err(_) => {
                return Err(StoreError::Unavailable(format!(
                    "nenhuma conexão livre no pool após {:?}",
                    config.connect_timeout
                )));
            }
        };

        loop {
            // O lock não pode atravessar o await do PING.
            let candidate = self.inner.idle.lock().pop();
            let Some(mut conn) = candidate else {
                break;
            };
            match timeout(config.op_timeout, conn.request(&Command::Ping(None))).await {
                Ok(Ok(frame)) if is_pong(&frame) => {
                    return Ok(PooledConnection::new(conn, self.inner.clone(), permit));
                }
                outcome => {
                    debug!("descartando conexão ociosa que falhou no PING: {outcome:?}");
                }
            }
        }

        let conn = dial(config, self.inner.tls.as_ref()).await?;
        Ok(PooledConnection::new(conn, self.inner.clone(), permit))
    }
}

/// Conexão emprestada do pool. Volta para a lista de ociosas no drop, a
/// menos que tenha ficado num estado desconhecido (erro de I/O, resposta
/// inesperada ou timeout no meio de um comando).
pub struct PooledConnection {
    conn: Option<Connection<BoxedStream>>,
    pool: Arc<PoolInner>,
    broken: bool,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    fn new(conn: Connection<BoxedStream>, pool: Arc<PoolInner>, permit: OwnedSemaphorePermit) -> Self {
        Self {
            conn: Some(conn),
            pool,
            broken: false,
            _permit: permit,
        }
    }

    /// Executa um comando. Respostas `-ERR` voltam como `Operation` sem
    /// invalidar a conexão; timeout vira `Unavailable`.
    ///
    /// A conexão fica marcada como quebrada enquanto o comando está em voo:
    /// se o future for cancelado entre a escrita e a leitura da resposta, o
    /// drop descarta a conexão em vez de devolvê-la com uma resposta pendente.
    pub async fn request(&mut self, cmd: &Command) -> StoreResult<Frame> {
        let op_timeout = self.pool.config.op_timeout;
        // Depois de uma falha a conexão pode ter uma resposta atrasada no buffer.
        if self.broken {
            return Err(StoreError::Unavailable("conexão já descartada".into()));
        }
        let Some(conn) = self.conn.as_mut() else {
            return Err(StoreError::Unavailable("conexão já descartada".into()));
        };

        self.broken = true;
        let reply = match timeout(op_timeout, conn.request(cmd)).await {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => return Err(StoreError::operation(e)),
            Err(_) => {
                return Err(StoreError::Unavailable(format!(
                    "timeout após {op_timeout:?} aguardando resposta"
                )));
            }
        };
        self.broken = false;

        match reply {
            Frame::Error(msg) => Err(StoreError::Operation(msg)),
            frame => Ok(frame),
        }
    }

    pub async fn get(&mut self, key: &str) -> StoreResult<Option<Bytes>> {
        match self.request(&Command::Get(key.to_string())).await? {
            Frame::Bulk(data) => Ok(Some(data)),
            Frame::Null => Ok(None),
            other => Err(self.unexpected("GET", other)),
        }
    }

    /// Retorna `false` quando a condição NX/XX impediu a escrita.
    pub async fn set(&mut self, key: &str, value: Bytes, options: SetOptions) -> StoreResult<bool> {
        let cmd = Command::Set {
            key: key.to_string(),
            value,
            options,
        };
        match self.request(&cmd).await? {
            Frame::Simple(_) => Ok(true),
            Frame::Null => Ok(false),
            other => Err(self.unexpected("SET", other)),
        }
    }

    /// Valor cru do TTL: `-2` inexistente, `-1` sem expiração.
    pub async fn ttl(&mut self, key: &str) -> StoreResult<i64> {
        match self.request(&Command::Ttl(key.to_string())).await? {
            Frame::Integer(n) => Ok(n),
            other => Err(self.unexpected("TTL", other)),
        }
    }

    pub async fn del(&mut self, key: &str) -> StoreResult<i64> {
        match self.request(&Command::Del(vec![key.to_string()])).await? {
            Frame::Integer(n) => Ok(n),
            other => Err(self.unexpected("DEL", other)),
        }
    }

    fn unexpected(&mut self, cmd: &str, frame: Frame) -> StoreError {
        self.broken = true;
        warn!("resposta inesperada ao {cmd}: {frame:?}");
        StoreError::Operation(format!("resposta inesperada ao {cmd}"))
    }
}

fn is_pong(frame: &Frame) -> bool {
    matches!(frame, Frame::Simple(s) if s == "PONG")
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take()
            && !self.broken
        {
            self.pool.idle.lock().push(conn);
        }
    }
}
