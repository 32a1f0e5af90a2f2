//! Compliance Registry Server Binary
//!
//! Runs the HTTP server that issues and verifies domain compliance records.

use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use compliance_registry::{
    create_router, AppState, DomainStore, KeyManager, MemoryStore, RegistryConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match RegistryConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Compliance registry stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: RegistryConfig) -> Result<(), Box<dyn std::error::Error>> {
    // The key is loaded (or minted) before accepting traffic
    let keys = Arc::new(KeyManager::new(config.private_key_path.clone()));
    let public_key = keys.public_key()?;

    let store = open_store(&config).await?;

    info!(
        addr = %config.socket_addr(),
        public_key = %public_key.to_hex(),
        key_path = %config.private_key_path.display(),
        "Starting compliance registry"
    );

    let addr = config.socket_addr();
    let state = Arc::new(AppState::new(config, keys, store));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Compliance registry listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Compliance registry shut down");
    Ok(())
}

#[cfg(feature = "postgres")]
async fn open_store(config: &RegistryConfig) -> Result<Arc<dyn DomainStore>, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(compliance_registry::storage::PostgresStore::new(url).await?)),
        None => {
            info!("DATABASE_URL not set, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(config: &RegistryConfig) -> Result<Arc<dyn DomainStore>, Box<dyn std::error::Error>> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but PostgreSQL support is not compiled in; using in-memory store");
    }
    info!("Using in-memory store; records are lost on restart");
    Ok(Arc::new(MemoryStore::new()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
