use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use pong_backend::config::AppConfig;
use pong_backend::services::janitor;
use pong_backend::services::oauth_service::{GithubProvider, OAuthProvider};
use pong_backend::utils::session::SessionCodec;
use pong_backend::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pong_backend=debug,actix_server=warn")),
        )
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    tracing::info!("Connecting to database...");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    db::init_schema(&db).await.map_err(std::io::Error::other)?;
    db::cleanup_incomplete_games(&db)
        .await
        .map_err(std::io::Error::other)?;
    janitor::sweep_once(&db, config.abandoned_tournament_minutes).await;
    tracing::info!("Database ready");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let janitor_task = tokio::spawn(janitor::run(
        db.clone(),
        config.abandoned_tournament_minutes,
        Duration::from_secs(config.janitor_interval_secs),
        shutdown_rx,
    ));

    if !config.github_configured() {
        tracing::warn!("GitHub OAuth not configured, /api/auth/github/* will fail");
    }

    let codec = web::Data::new(SessionCodec::from_config(&config));
    let provider: Arc<dyn OAuthProvider> = Arc::new(GithubProvider::from_config(&config));
    let provider = web::Data::from(provider);
    let db_data = web::Data::new(db);
    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    tracing::info!(host = %bind.0, port = bind.1, "Starting server");

    let result = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db_data.clone())
            .app_data(config.clone())
            .app_data(codec.clone())
            .app_data(provider.clone())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await;

    // Le serveur est arrêté : on coupe le janitor
    let _ = shutdown_tx.send(true);
    if let Err(e) = janitor_task.await {
        tracing::error!(error = %e, "Janitor task failed");
    }
    tracing::info!("Server stopped");

    result
}
