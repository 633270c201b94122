use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig as TlsConfig, RootCertStore};
use tracing::debug;

use ttlpaste_common::{StoreError, StoreResult};
use ttlpaste_protocol::{Command, Connection, Frame};

use crate::ClientConfig;

/// Stream de transporte: TCP puro ou TLS sobre TCP.
pub trait Io: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Io for T {}

pub type BoxedStream = Box<dyn Io>;

/// Conector TLS com as raízes do webpki.
pub fn tls_connector() -> TlsConnector {
    let roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.into(),
    };
    let config = TlsConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

/// Abre uma conexão pronta para uso: TCP, TLS opcional, AUTH e PING.
/// Qualquer falha aqui (inclusive timeout) é `Unavailable`.
pub async fn dial(
    config: &ClientConfig,
    tls: Option<&TlsConnector>,
) -> StoreResult<Connection<BoxedStream>> {
    let addr = config.addr();
    match timeout(config.connect_timeout, handshake(config, tls)).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Unavailable(format!(
            "timeout conectando em {addr} ({:?})",
            config.connect_timeout
        ))),
    }
}

async fn handshake(
    config: &ClientConfig,
    tls: Option<&TlsConnector>,
) -> StoreResult<Connection<BoxedStream>> {
    let addr = config.addr();
    let tcp = TcpStream::connect(&addr)
        .await
        .map_err(|e| StoreError::Unavailable(format!("{addr}: {e}")))?;
    let _ = tcp.set_nodelay(true);

    let stream: BoxedStream = match tls {
        Some(connector) => {
            let name = ServerName::try_from(config.host.clone())
                .map_err(|e| StoreError::Unavailable(format!("host TLS inválido: {e}")))?;
            let tls_stream = connector
                .connect(name, tcp)
                .await
                .map_err(|e| StoreError::Unavailable(format!("handshake TLS falhou: {e}")))?;
            Box::new(tls_stream)
        }
        None => Box::new(tcp),
    };

    let mut conn = Connection::new(stream);

    if let Some(password) = &config.password {
        let auth = Command::Auth {
            username: config.username.clone(),
            password: password.clone(),
        };
        match conn.request(&auth).await.map_err(StoreError::unavailable)? {
            Frame::Simple(_) => {}
            Frame::Error(msg) => {
                return Err(StoreError::Unavailable(format!("AUTH recusado: {msg}")));
            }
            other => {
                return Err(StoreError::Unavailable(format!(
                    "resposta inesperada ao AUTH: {other:?}"
                )));
            }
        }
    }

    match conn
        .request(&Command::Ping(None))
        .await
        .map_err(StoreError::unavailable)?
    {
        Frame::Simple(_) => {}
        Frame::Error(msg) => return Err(StoreError::Unavailable(msg)),
        other => {
            return Err(StoreError::Unavailable(format!(
                "resposta inesperada ao PING: {other:?}"
            )));
        }
    }

    debug!("nova conexão com backend em {addr} (tls={})", tls.is_some());
    Ok(conn)
}
