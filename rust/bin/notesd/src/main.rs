//! `notesd`: the note server binary.
//!
//! Usage:
//!   notesd [-c <config.toml>] [--listen <addr>] [--sqlite <path>] [--pool-size <n>] [--reset-db]
//!
//! Without a config file the server listens on 0.0.0.0:8080 and stores
//! notes in `./notes.db`.

mod config;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use notes_core::Module;
use tracing::info;

/// Note server.
#[derive(Parser, Debug)]
#[command(name = "notesd", about = "Note server", version)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,

    /// SQLite database file (overrides the config file).
    #[arg(long = "sqlite")]
    sqlite: Option<PathBuf>,

    /// Maximum pooled database connections (overrides the config file).
    #[arg(long = "pool-size")]
    pool_size: Option<usize>,

    /// Drop and recreate the notes table before serving.
    #[arg(long = "reset-db")]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration.
    if let Some(path) = &cli.config {
        info!("Loading configuration from {}", path.display());
    }
    let service_config = config::apply(
        config::load(cli.config.as_deref())?,
        config::Overrides {
            listen: cli.listen,
            sqlite_path: cli.sqlite,
            pool_size: cli.pool_size,
        },
    );

    // Initialize storage.
    if let Some(data_dir) = &service_config.data_dir {
        std::fs::create_dir_all(data_dir)?;
    }
    let sqlite_path = service_config.resolve_sqlite_path();
    let sql: Arc<dyn notes_sql::SQLStore> = Arc::new(
        notes_sql::SqliteStore::open_pooled(&sqlite_path, service_config.pool_size)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    info!(
        "SQL store opened at {} (pool size {})",
        sqlite_path.display(),
        service_config.pool_size
    );

    let note_service = note::service::NoteService::new(Arc::clone(&sql))?;
    if cli.reset_db {
        note_service.reset_schema()?;
    }
    let note_module = note::NoteModule::new(note_service);
    info!("Note module initialized");

    let module_routes = vec![(note_module.name(), note_module.routes())];
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&service_config.listen).await?;
    info!("notesd listening on {}", service_config.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("notesd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
