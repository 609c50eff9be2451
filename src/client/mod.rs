//! Appointment data sources: the REST backend or a local JSON fixture.
//!
//! Every call is a single fire-and-await request: no retries, no backoff,
//! no de-duplication of concurrent requests.

mod fixture;
mod rest;

pub use fixture::FixtureSource;
pub use rest::{ApiClient, AppointmentDraft, LoginResponse, DEFAULT_TIMEOUT_SECS};

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::Appointment;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Backend is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Backend returned error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Unknown role from backend: {0}")]
    UnknownRole(String),

    #[error("Cannot read fixture {}: {source}", path.display())]
    Fixture {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Anything that can hand over the current list of appointments.
pub trait AppointmentSource: Send + Sync {
    fn fetch_appointments(&self)
        -> impl Future<Output = Result<Vec<Appointment>, ClientError>> + Send;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// The source the server was started with.
#[derive(Debug, Clone)]
pub enum DataSource {
    Backend(ApiClient),
    Fixture(FixtureSource),
}

impl DataSource {
    /// The REST client, when running against a backend.
    pub fn backend(&self) -> Option<&ApiClient> {
        match self {
            Self::Backend(client) => Some(client),
            Self::Fixture(_) => None,
        }
    }
}

impl AppointmentSource for DataSource {
    async fn fetch_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        match self {
            Self::Backend(client) => client.fetch_appointments().await,
            Self::Fixture(fixture) => fixture.fetch_appointments().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Backend(client) => client.describe(),
            Self::Fixture(fixture) => fixture.describe(),
        }
    }
}
