pub mod api;
pub mod calendar;
pub mod client;
pub mod config;
pub mod core_state;
pub mod models;
pub mod schedule;
pub mod session;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::client::{ApiClient, ClientError, DataSource, FixtureSource, DEFAULT_TIMEOUT_SECS};
use crate::config::Settings;
use crate::core_state::{CoreError, CoreState};
use crate::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Backend setup failed: {0}")]
    Client(#[from] ClientError),
    #[error("State error: {0}")]
    Core(#[from] CoreError),
    #[error("Server error: {0}")]
    Server(#[from] api::ServerError),
    #[error("Cannot listen for shutdown signal: {0}")]
    Signal(std::io::Error),
}

/// Start the dashboard server and run until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = Settings::from_env();
    let core = Arc::new(build_core(&settings).await?);

    let mut server = api::start_api_server(core, settings.bind).await?;
    tracing::info!(addr = %server.session.server_addr, "Dashboard API listening");

    tokio::signal::ctrl_c().await.map_err(StartupError::Signal)?;
    server.shutdown();
    server.wait().await;
    Ok(())
}

/// Wire the source, open the session and load the first snapshot.
///
/// A failed login or initial load is logged, not fatal: the server starts
/// signed out or with an empty list, and `POST /api/appointments/refresh`
/// can retry the load.
async fn build_core(settings: &Settings) -> Result<CoreState, StartupError> {
    let core = CoreState::new(settings.timeline, settings.week_start);

    let (core, session) = if let Some(url) = &settings.backend_url {
        let client = ApiClient::new(url, DEFAULT_TIMEOUT_SECS)?;
        match &settings.credentials {
            Some(creds) => match client.login(&creds.email, &creds.password).await {
                Ok(session) => {
                    let client = client.with_token(session.access_token.clone());
                    (core.with_source(DataSource::Backend(client)), Some(session))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Backend login failed; starting signed out");
                    (core.with_source(DataSource::Backend(client)), None)
                }
            },
            None => {
                tracing::warn!("MEDBOARD_BACKEND_URL set without MEDBOARD_EMAIL/MEDBOARD_PASSWORD; no session opened");
                (core.with_source(DataSource::Backend(client)), None)
            }
        }
    } else if let Some(path) = &settings.fixture {
        let session = Session {
            user_id: "local".into(),
            email: "local@localhost".into(),
            role: settings.local_session.role,
            patient_id: settings.local_session.patient_id.clone(),
            access_token: String::new(),
        };
        (
            core.with_source(DataSource::Fixture(FixtureSource::new(path))),
            Some(session),
        )
    } else {
        tracing::warn!("No appointment source configured; serving an empty schedule");
        (core, None)
    };

    if let Some(session) = session {
        core.sign_in(session)?;
    }

    if core.source().is_some() {
        if let Err(e) = core.refresh().await {
            tracing::warn!(error = %e, "Initial appointment load failed");
        }
    }

    Ok(core)
}
