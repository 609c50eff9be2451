use std::net::SocketAddr;
use std::path::PathBuf;

use crate::calendar::{
    TimelineConfig, DEFAULT_END_HOUR, DEFAULT_PIXELS_PER_MINUTE, DEFAULT_START_HOUR,
};
use crate::models::{Role, WeekStart};

/// Application-level constants
pub const APP_NAME: &str = "Medboard";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:8090";
pub const FIXTURE_FILE_NAME: &str = "appointments.json";

/// Used when `RUST_LOG` is unset or invalid.
pub fn default_log_filter() -> &'static str {
    "medboard=info,tower_http=warn"
}

/// ~/Medboard/ on all platforms. `None` when there is no home directory.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

/// ~/Medboard/appointments.json
pub fn default_fixture_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(FIXTURE_FILE_NAME))
}

// ═══════════════════════════════════════════════════════════
// Runtime settings
// ═══════════════════════════════════════════════════════════

/// Backend login used at startup.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Session opened at startup when running from a fixture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSession {
    pub role: Role,
    pub patient_id: Option<String>,
}

/// Everything read from the environment at startup.
///
/// Invalid values never abort startup: they are logged and replaced by the
/// default.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    pub backend_url: Option<String>,
    pub credentials: Option<Credentials>,
    pub fixture: Option<PathBuf>,
    pub local_session: LocalSession,
    pub timeline: TimelineConfig,
    pub week_start: WeekStart,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (the environment in production,
    /// a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let default_bind: SocketAddr = SocketAddr::from(([127, 0, 0, 1], 8090));
        let bind = parse_or(get("MEDBOARD_BIND"), "MEDBOARD_BIND", default_bind);

        let backend_url = get("MEDBOARD_BACKEND_URL");
        let credentials = match (get("MEDBOARD_EMAIL"), lookup("MEDBOARD_PASSWORD")) {
            (Some(email), Some(password)) => Some(Credentials { email, password }),
            _ => None,
        };

        let fixture = get("MEDBOARD_FIXTURE")
            .map(PathBuf::from)
            .or_else(|| default_fixture_path().filter(|p| p.is_file()));

        let role = match get("MEDBOARD_ROLE") {
            Some(raw) => Role::from_backend(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring MEDBOARD_ROLE");
                Role::Doctor
            }),
            None => Role::Doctor,
        };
        let local_session = LocalSession {
            role,
            patient_id: get("MEDBOARD_PATIENT_ID"),
        };

        let start = parse_or(get("MEDBOARD_START_HOUR"), "MEDBOARD_START_HOUR", DEFAULT_START_HOUR);
        let end = parse_or(get("MEDBOARD_END_HOUR"), "MEDBOARD_END_HOUR", DEFAULT_END_HOUR);
        let ppm = parse_or(
            get("MEDBOARD_PIXELS_PER_MINUTE"),
            "MEDBOARD_PIXELS_PER_MINUTE",
            DEFAULT_PIXELS_PER_MINUTE,
        );
        let timeline = TimelineConfig::new(start, end, ppm).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid timeline settings, using defaults");
            TimelineConfig::default()
        });

        let week_start = match get("MEDBOARD_WEEK_START") {
            Some(raw) => raw.to_ascii_lowercase().parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring MEDBOARD_WEEK_START");
                WeekStart::default()
            }),
            None => WeekStart::default(),
        };

        Self {
            bind,
            backend_url,
            credentials,
            fixture,
            local_session,
            timeline,
            week_start,
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value, "Invalid setting, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir().unwrap();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Medboard"));
    }

    #[test]
    fn fixture_path_under_app_data() {
        let path = default_fixture_path().unwrap();
        assert!(path.starts_with(app_data_dir().unwrap()));
        assert!(path.ends_with(FIXTURE_FILE_NAME));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults() {
        let s = settings(&[]);
        assert_eq!(s.bind.to_string(), DEFAULT_BIND);
        assert!(s.backend_url.is_none());
        assert!(s.credentials.is_none());
        assert_eq!(s.timeline, TimelineConfig::default());
        assert_eq!(s.week_start, WeekStart::Sunday);
        assert_eq!(s.local_session.role, Role::Doctor);
    }

    #[test]
    fn overrides_are_applied() {
        let s = settings(&[
            ("MEDBOARD_BIND", "0.0.0.0:9000"),
            ("MEDBOARD_BACKEND_URL", "http://localhost:8081/api"),
            ("MEDBOARD_EMAIL", "doc@example.com"),
            ("MEDBOARD_PASSWORD", "secret"),
            ("MEDBOARD_FIXTURE", "/tmp/appointments.json"),
            ("MEDBOARD_ROLE", "PATIENT"),
            ("MEDBOARD_PATIENT_ID", "P001"),
            ("MEDBOARD_START_HOUR", "8"),
            ("MEDBOARD_END_HOUR", "18"),
            ("MEDBOARD_PIXELS_PER_MINUTE", "1.5"),
            ("MEDBOARD_WEEK_START", "Monday"),
        ]);
        assert_eq!(s.bind.port(), 9000);
        assert_eq!(s.backend_url.as_deref(), Some("http://localhost:8081/api"));
        assert_eq!(s.credentials.as_ref().map(|c| c.email.as_str()), Some("doc@example.com"));
        assert_eq!(s.fixture, Some(PathBuf::from("/tmp/appointments.json")));
        assert_eq!(
            s.local_session,
            LocalSession {
                role: Role::Patient,
                patient_id: Some("P001".into())
            }
        );
        assert_eq!(s.timeline, TimelineConfig::new(8, 18, 1.5).unwrap());
        assert_eq!(s.week_start, WeekStart::Monday);
    }

    #[test]
    fn invalid_values_fall_back() {
        let s = settings(&[
            ("MEDBOARD_BIND", "not-an-addr"),
            ("MEDBOARD_START_HOUR", "20"),
            ("MEDBOARD_END_HOUR", "9"),
            ("MEDBOARD_PIXELS_PER_MINUTE", "fast"),
            ("MEDBOARD_WEEK_START", "friday"),
            ("MEDBOARD_ROLE", "janitor"),
        ]);
        assert_eq!(s.bind.to_string(), DEFAULT_BIND);
        assert_eq!(s.timeline, TimelineConfig::default());
        assert_eq!(s.week_start, WeekStart::Sunday);
        assert_eq!(s.local_session.role, Role::Doctor);
    }

    #[test]
    fn credentials_need_both_parts() {
        let s = settings(&[("MEDBOARD_EMAIL", "doc@example.com")]);
        assert!(s.credentials.is_none());
    }

    #[test]
    fn password_is_not_logged() {
        let creds = Credentials {
            email: "a@b.c".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
