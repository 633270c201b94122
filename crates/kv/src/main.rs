use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use ttlpaste_common::{DEFAULT_HOST, DEFAULT_KV_PORT, MAX_CONNECTIONS};
use ttlpaste_kv::{ServerConfig, run};
use ttlpaste_storage::Db;

#[derive(Parser, Debug)]
#[command(
    name = "ttlpaste-kv",
    about = "ttlpaste-kv: store RESP in-memory com TTL para desenvolvimento"
)]
struct Args {
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, default_value_t = DEFAULT_KV_PORT)]
    port: u16,
    #[arg(long, default_value_t = MAX_CONNECTIONS)]
    max_connections: usize,
    /// Exige AUTH <senha> antes dos demais comandos
    #[arg(long, env = "TTLPASTE_KV_REQUIREPASS")]
    requirepass: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttlpaste_kv=info".into()),
        )
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let listener = TcpListener::bind(&addr).await?;
    info!("ttlpaste-kv escutando em {addr}");

    let config = ServerConfig {
        max_connections: args.max_connections,
        requirepass: args.requirepass,
    };
    run(listener, Db::new(), config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await;

    Ok(())
}
