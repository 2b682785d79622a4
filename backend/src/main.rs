//! User directory entry-point: loads settings and secrets, runs migrations
//! and starts the HTTP server.

use actix_web::web;
use color_eyre::eyre::{Context, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use user_directory::inbound::http::health::HealthState;
use user_directory::outbound::notifications::WebhookNotificationSink;
use user_directory::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use user_directory::server::{ServerConfig, create_server};
use user_directory::settings::{BuildMode, ServiceSettings};

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let mode = BuildMode::from_debug_assertions();

    let secrets = settings.load_secrets(mode)?;
    info!(
        token_key_fingerprint = %secrets.token_fingerprint(),
        session_key_fingerprint = %secrets.session_fingerprint(),
        "secrets loaded"
    );

    let mut config = ServerConfig::new(
        secrets.session_key,
        settings.cookie_secure(),
        settings.same_site(mode)?,
        settings.bind_addr()?,
        secrets.signer,
    );

    if let Some(database_url) = settings.database_url() {
        let url = database_url.to_owned();
        tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .wrap_err("migration task panicked")??;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|err| eyre!("failed to create database pool: {err}"))?;
        info!("using PostgreSQL user store");
        config = config.with_db_pool(pool);
    } else {
        warn!("no database_url configured; records are kept in memory");
    }

    if let Some(url) = settings.notification_webhook_url()? {
        let sink = WebhookNotificationSink::new(url, settings.notification_timeout())
            .wrap_err("failed to build webhook client")?;
        config = config.with_webhook(sink);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await?;
    Ok(())
}
