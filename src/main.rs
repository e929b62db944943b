use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};

use liceum::cli::{Cli, Commands};
use liceum::logging::init_tracing;
use liceum::metrics::{init_metrics, metrics_app};
use liceum::router::init_router;
use liceum::state::init_app_state;
use liceum_config::ServerConfig;
use liceum_db::{init_db_pool, run_migrations};

/// How often expired one-time codes are swept from memory.
const CODE_PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let server_config = ServerConfig::from_env();
    init_tracing(&server_config.log_dir).context("Failed to initialize tracing")?;

    let pool = init_db_pool()
        .await
        .context("Failed to connect to database")?;

    match cli.command() {
        Commands::Migrate => {
            run_migrations(&pool).await?;
        }
        Commands::CleanEvents => {
            let state = init_app_state(pool, &server_config)?;
            let removed = state.events.clean_events().await?;
            info!(events.removed = %removed, "Cleanup finished");
        }
        Commands::Serve => serve(pool, server_config).await?,
    }

    Ok(())
}

async fn serve(pool: liceum_db::PgPool, server_config: ServerConfig) -> anyhow::Result<()> {
    run_migrations(&pool).await?;

    let state = init_app_state(pool, &server_config)?;

    let auth = state.auth.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CODE_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            auth.code_store().purge_expired().await;
        }
    });

    let mut app = init_router(state);
    if server_config.metrics_enabled {
        let handle = init_metrics().context("Failed to install Prometheus recorder")?;
        app = app.merge(metrics_app(handle));
    } else {
        warn!("METRICS_ENABLED is false; /metrics is not served");
    }

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Server running on http://{}", address);
    info!("Swagger UI available at http://{}/swagger-ui", address);
    info!("Scalar UI available at http://{}/scalar", address);

    axum::serve(listener, app).await?;
    Ok(())
}
