use anyhow::Context;
use backend::core::{AppState, Config};
use backend::{create_router, initial_data, openapi::ApiDoc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

#[derive(Parser)]
#[command(name = "backend", version, about = "Users and items REST API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Applica le migrazioni, crea il primo superuser e avvia il server (default)
    Serve,
    /// Applica solo le migrazioni
    Migrate,
    /// Applica le migrazioni e crea il primo superuser
    InitData,
    /// Stampa il documento OpenAPI
    Openapi {
        /// File di destinazione, altrimenti stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // l'export OpenAPI non ha bisogno né di configurazione né di database
    if let Some(Command::Openapi { output }) = &cli.command {
        let document = ApiDoc::openapi()
            .to_pretty_json()
            .context("failed to serialize OpenAPI document")?;
        match output {
            Some(path) => std::fs::write(path, document)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("{document}"),
        }
        return Ok(());
    }

    // 1. Configurazione da .env / variabili d'ambiente
    let config = Config::from_env().context("invalid configuration")?;
    config.print_info();

    // 2. Pool di connessioni e migrazioni
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url())
        .await
        .context("failed to connect to the database")?;
    info!("Database connection pool created");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    info!("Database migrations applied");

    let state = Arc::new(AppState::new(pool, config));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => Ok(()),
        Command::InitData => init_data(&state).await,
        Command::Serve => {
            init_data(&state).await?;
            serve(state).await
        }
        Command::Openapi { .. } => Ok(()),
    }
}

async fn init_data(state: &AppState) -> anyhow::Result<()> {
    initial_data::init_db(state)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create initial data: {}", e.message()))?;
    Ok(())
}

async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server_host, state.config.server_port);
    let app = create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// Attende SIGINT (Ctrl-C) o SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
