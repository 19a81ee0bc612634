//! Tessera API Server
//!
//! Main entry point for the Tessera backend service.

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessera_api::jobs::{JobRegistry, JobRunner};
use tessera_api::{AppState, create_router};
use tessera_db::connect;
use tessera_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessera=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!(max_connections = config.database.max_connections, "Connected to database");

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = if config.jobs.enabled {
        let runner = JobRunner::new(db.clone(), JobRegistry::with_defaults(&db), &config.jobs);
        Some(tokio::spawn(runner.run(shutdown_rx)))
    } else {
        info!("Job runner disabled by configuration");
        None
    };

    let app = create_router(AppState::new(db, jwt_service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    shutdown_tx.send(true).ok();
    if let Some(runner) = runner {
        runner.await?;
    }
    Ok(())
}
