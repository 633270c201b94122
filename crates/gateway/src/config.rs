use std::time::Duration;

use clap::{Parser, ValueEnum};

use ttlpaste_client::ClientConfig;
use ttlpaste_common::{DEFAULT_HOST, DEFAULT_KV_PORT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Servidor RESP (Redis ou ttlpaste-kv)
    Redis,
    /// Db em processo; os pastes somem quando o processo termina
    Memory,
}

#[derive(Parser, Debug)]
#[command(
    name = "ttlpaste",
    version,
    about = "ttlpaste: pastes de código temporários servidos por HTTP"
)]
pub struct Args {
    #[arg(long, env = "TTLPASTE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    #[arg(long, env = "TTLPASTE_PORT", default_value_t = 5000)]
    pub port: u16,
    /// Prefixo das URLs devolvidas pelo upload
    #[arg(long, env = "TEMP_FILE_URL", default_value = "http://127.0.0.1:5000")]
    pub base_url: String,
    #[arg(long, env = "TTLPASTE_BACKEND", value_enum, default_value_t = BackendKind::Redis)]
    pub backend: BackendKind,

    #[arg(long, env = "REDIS_HOST", default_value = DEFAULT_HOST)]
    pub redis_host: String,
    #[arg(long, env = "REDIS_PORT", default_value_t = DEFAULT_KV_PORT)]
    pub redis_port: u16,
    #[arg(long, env = "REDIS_USERNAME")]
    pub redis_username: Option<String>,
    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    pub redis_password: Option<String>,
    /// TLS logo após o connect
    #[arg(long, env = "REDIS_TLS")]
    pub redis_tls: bool,

    #[arg(long, env = "TTLPASTE_POOL_SIZE", default_value_t = 16)]
    pub pool_size: usize,
    #[arg(long, env = "TTLPASTE_CONNECT_TIMEOUT_MS", default_value_t = 2000)]
    pub connect_timeout_ms: u64,
    #[arg(long, env = "TTLPASTE_OP_TIMEOUT_MS", default_value_t = 2000)]
    pub op_timeout_ms: u64,
}

impl Args {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            host: self.redis_host.clone(),
            port: self.redis_port,
            username: self.redis_username.clone(),
            password: self.redis_password.clone(),
            tls: self.redis_tls,
            pool_size: self.pool_size.max(1),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            op_timeout: Duration::from_millis(self.op_timeout_ms),
        }
    }
}
