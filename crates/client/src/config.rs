use std::time::Duration;

use ttlpaste_common::{DEFAULT_HOST, DEFAULT_KV_PORT};

/// Parâmetros de conexão com o backend RESP.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// TLS logo após o connect (ex.: Redis gerenciado).
    pub tls: bool,
    /// Máximo de conexões abertas ao mesmo tempo.
    pub pool_size: usize,
    /// Limite para dial + TLS + AUTH, e para esperar vaga no pool.
    pub connect_timeout: Duration,
    /// Limite por comando.
    pub op_timeout: Duration,
}

impl ClientConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_KV_PORT,
            username: None,
            password: None,
            tls: false,
            pool_size: 16,
            connect_timeout: Duration::from_secs(2),
            op_timeout: Duration::from_secs(2),
        }
    }
}
