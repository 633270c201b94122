use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast};
use tracing::{error, info};

use ttlpaste_common::MAX_CONNECTIONS;
use ttlpaste_protocol::Connection;
use ttlpaste_storage::Db;

use crate::{Session, handle_connection};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub max_connections: usize,
    /// Senha exigida via AUTH antes de qualquer outro comando.
    pub requirepass: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_connections: MAX_CONNECTIONS,
            requirepass: None,
        }
    }
}

/// Accept loop. Retorna quando `shutdown` completa; conexões abertas
/// recebem o sinal e encerram no próximo frame.
pub async fn run(
    listener: TcpListener,
    db: Db,
    config: ServerConfig,
    shutdown: impl Future<Output = ()>,
) {
    // Zero vagas travaria o accept para sempre.
    let semaphore = Arc::new(Semaphore::new(config.max_connections.max(1)));
    let requirepass: Option<Arc<str>> = config.requirepass.map(Arc::from);
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    tokio::pin!(shutdown);

    loop {
        let permit = tokio::select! {
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
            _ = &mut shutdown => break,
        };

        let (socket, addr) = tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok(v) => v,
                    Err(e) => {
                        error!("erro ao aceitar conexão: {e}");
                        continue;
                    }
                }
            }
            _ = &mut shutdown => break,
        };

        info!("nova conexão: {addr}");
        let db = db.clone();
        let session = Session::new(requirepass.clone());
        let mut shutdown_rx = shutdown_tx.subscribe();

        tokio::spawn(async move {
            let conn = Connection::new(socket);
            if let Err(e) = handle_connection(conn, db, session, &mut shutdown_rx).await {
                error!("erro na conexão {addr}: {e}");
            }
            info!("conexão encerrada: {addr}");
            drop(permit);
        });
    }

    info!("shutdown signal recebido");
    drop(shutdown_tx);
}
