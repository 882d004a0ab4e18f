//! Application bootstrap: config, database pool, migrations, and the
//! orchestrator/router wiring needed to serve traffic.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use figment::{providers::Env, Figment};
use sqlx::postgres::PgPoolOptions;
use sqlx::ConnectOptions;
use tracing::info;

use crate::config::Config;
use crate::data::postgres::PgRepository;
use crate::domain::persistence::EnrollmentRepository;
use crate::orchestrator::Orchestrator;
use crate::state::AppState;
use crate::web::routes::create_router;

pub struct App {
    config: Config,
    router: Router,
    orchestrator: Arc<Orchestrator>,
}

impl App {
    /// Load config, connect to Postgres, run migrations, warm the
    /// orchestrator from persisted state, and build the router.
    pub async fn new() -> Result<Self, anyhow::Error> {
        let config: Config = Figment::new()
            .merge(Env::raw())
            .extract()
            .context("failed to load config")?;

        let connect_options = sqlx::postgres::PgConnectOptions::from_str(&config.database_url)
            .context("failed to parse database URL")?
            .log_statements(tracing::log::LevelFilter::Debug)
            .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(1));

        let db_pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout())
            .idle_timeout(Duration::from_secs(60 * 2))
            .max_lifetime(Duration::from_secs(60 * 30))
            .connect_with(connect_options)
            .await
            .context("failed to create database pool")?;

        info!(
            max_connections = config.db_max_connections,
            acquire_timeout = ?config.db_acquire_timeout(),
            "database pool established"
        );

        info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("failed to run database migrations")?;

        let repo: Arc<dyn EnrollmentRepository> = Arc::new(PgRepository::new(db_pool.clone()));

        let registration_config = match repo.get_config().await? {
            Some(config) => config,
            None => repo.create_config().await?,
        };
        let was_enabled = registration_config.enabled;

        let orchestrator = Arc::new(Orchestrator::new(registration_config, repo));
        orchestrator
            .resume_if_enabled(was_enabled)
            .await
            .context("failed to resume registration from persisted state")?;

        let app_state = AppState::new(
            db_pool,
            orchestrator.clone(),
            config.session_cookie_name.clone(),
            config.admin_username.clone(),
            config.admin_password.clone(),
        );

        let router = create_router(app_state);

        Ok(App {
            config,
            router,
            orchestrator,
        })
    }

    /// Serve HTTP traffic until a shutdown signal arrives, then drain
    /// in-flight requests for up to the configured grace period.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = format!("0.0.0.0:{}", self.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        info!(%addr, "listening");

        let shutdown_timeout = self.config.shutdown_timeout();
        let orchestrator = self.orchestrator.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(orchestrator, shutdown_timeout))
            .await
            .context("server error")?;

        Ok(())
    }
}

/// Waits for SIGINT/SIGTERM, pauses registration so the engine stops
/// accepting new enrollments, then returns so Axum can drain in-flight
/// requests for up to `grace_period`.
async fn shutdown_signal(orchestrator: Arc<Orchestrator>, grace_period: Duration) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(?grace_period, "shutdown signal received, pausing registration");
    if let Err(e) = orchestrator.pause_registration().await {
        tracing::warn!(error = ?e, "failed to pause registration during shutdown");
    }
}
