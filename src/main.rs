use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info, warn};

use flavorwave_api as api;

#[derive(Debug, Parser)]
#[command(name = "flavorwave-api", version, about = "FlavorWave operations API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server and the outbox dispatcher (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => migrate(&cfg).await,
        Command::Serve => serve(cfg).await,
    }
}

async fn migrate(cfg: &api::config::AppConfig) -> anyhow::Result<()> {
    let db_pool = api::db::establish_connection_from_app_config(cfg).await?;
    api::db::run_migrations(&db_pool).await?;
    api::db::close_pool(db_pool).await?;
    Ok(())
}

async fn serve(cfg: api::config::AppConfig) -> anyhow::Result<()> {
    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    let db_arc = Arc::new(db_pool);

    // Outbox dispatcher delivering workflow notifications
    let sink = api::events::build_sink(&cfg)?;
    let outbox_worker = api::events::outbox::start_worker(
        db_arc.clone(),
        sink,
        api::events::outbox::OutboxSettings::from(&cfg),
    );

    let app_state = api::AppState::new(db_arc.clone(), cfg.clone());
    let app = api::build_router(app_state)?;

    let ip = cfg
        .host
        .parse()
        .with_context(|| format!("invalid host address '{}'", cfg.host))?;
    let addr = SocketAddr::new(ip, cfg.port);
    info!("flavorwave-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("shutting down outbox worker");
    outbox_worker.shutdown().await;

    match Arc::try_unwrap(db_arc) {
        Ok(pool) => api::db::close_pool(pool).await?,
        Err(_) => warn!("database pool still shared at shutdown; leaving it to drop"),
    }

    served.context("server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
