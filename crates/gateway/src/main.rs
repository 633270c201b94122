use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use ttlpaste_client::Pool;
use ttlpaste_gateway::{
    PasteStore,
    backend::{KvStore, MemoryStore},
    config::{Args, BackendKind},
    http,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env é opcional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttlpaste_gateway=info,ttlpaste_client=info".into()),
        )
        .init();

    let args = Args::parse();

    let backend: Arc<dyn KvStore> = match args.backend {
        BackendKind::Redis => {
            let config = args.client_config();
            info!(
                "backend RESP em {} (tls: {}, pool: {})",
                config.addr(),
                config.tls,
                config.pool_size
            );
            Arc::new(Pool::new(config))
        }
        BackendKind::Memory => {
            info!("backend em memória; nada sobrevive a um restart");
            Arc::new(MemoryStore::new())
        }
    };
    let store = Arc::new(PasteStore::new(backend, args.base_url()));

    let addr = args.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("ttlpaste escutando em {addr}, URLs em {}", args.base_url());

    axum::serve(listener, http::router(store))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("sinal recebido, encerrando");
        })
        .await?;

    Ok(())
}
