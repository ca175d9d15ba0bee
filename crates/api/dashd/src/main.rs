use anyhow::{Context, Result};
use dash_api::build_router;
use dash_api::state::ApiState;
use dash_auth::{AuthError, AuthService, AuthSettings, NewUser};
use dash_common::{Config, LoggingConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Create the first admin from `DASH_ADMIN_EMAIL` / `DASH_ADMIN_PASSWORD`
/// when the user table is empty.
fn bootstrap_admin(auth: &AuthService) -> Result<()> {
    if auth.users.count()? > 0 {
        return Ok(());
    }
    let (Ok(email), Ok(password)) = (
        std::env::var("DASH_ADMIN_EMAIL"),
        std::env::var("DASH_ADMIN_PASSWORD"),
    ) else {
        warn!("No users configured; set DASH_ADMIN_EMAIL and DASH_ADMIN_PASSWORD to create one");
        return Ok(());
    };

    let name = std::env::var("DASH_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());
    match auth.users.create(NewUser {
        email,
        name,
        password,
        image: None,
    }) {
        Ok(user) => info!(email = %user.email, "Bootstrap admin created"),
        Err(AuthError::UserExists(email)) => info!(%email, "Bootstrap admin already exists"),
        Err(e) => return Err(e).context("Failed to create bootstrap admin"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    info!("dashd starting...");

    let settings = AuthSettings::new(
        config.auth.session_cookie.clone(),
        config.auth.session_ttl_hours,
        config.auth.remember_days,
    )
    .context("Invalid auth settings")?;
    let db_path = Path::new(&config.auth.database_path);
    let auth = Arc::new(
        AuthService::open(db_path, settings)
            .with_context(|| format!("Failed to open auth database {}", db_path.display()))?,
    );
    bootstrap_admin(&auth)?;

    // Periodically drop expired sessions
    let purge_auth = auth.clone();
    let purge_every = Duration::from_secs(config.auth.purge_interval_secs.max(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_every);
        loop {
            interval.tick().await;
            match purge_auth.sessions.purge_expired() {
                Ok(0) => {}
                Ok(n) => info!("Purged {} expired sessions", n),
                Err(e) => warn!("Session purge failed: {}", e),
            }
        }
    });

    let bind = config.server.bind.clone();
    let state = ApiState::new(auth, Arc::new(config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("dashd stopped");
    Ok(())
}
