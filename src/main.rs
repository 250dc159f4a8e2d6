use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use atelier::auth::JwtManager;
use atelier::db::Db;
use atelier::router::AtelierState;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &atelier::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        bind = %cfg.bind,
        db_host = %cfg.db.host,
        database = %cfg.db.database,
        hosted = cfg.hosted,
        "starting atelier backend"
    );

    let db = Arc::new(Db::new(cfg.db.clone()));

    // Hosted platforms skip the startup bootstrap; the schema is set up on
    // demand through the repair endpoint instead.
    if !cfg.hosted {
        if atelier::db::setup_database(&db).await {
            info!("database ready");
        } else {
            warn!("database not reachable at startup, serving in degraded mode");
        }
    }

    let jwt = Arc::new(JwtManager::new(cfg.jwt_secret.clone(), cfg.token_ttl_hours));
    let state = AtelierState::new(db, jwt);
    let app = atelier::router::atelier_router(state);

    let listener = TcpListener::bind(&cfg.bind).await?;
    info!("HTTP server listening on {}", cfg.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
