use std::path::{Path, PathBuf};

use super::{AppointmentSource, ClientError};
use crate::models::{decode_records, Appointment};

/// Appointments read from a JSON array on disk (demo data, offline use).
#[derive(Debug, Clone)]
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AppointmentSource for FixtureSource {
    async fn fetch_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ClientError::Fixture {
                path: self.path.clone(),
                source,
            })?;
        let values: Vec<serde_json::Value> =
            serde_json::from_str(&raw).map_err(|e| ClientError::ResponseParsing(e.to_string()))?;
        Ok(decode_records(values))
    }

    fn describe(&self) -> String {
        format!("fixture {}", self.path.display())
    }
}
