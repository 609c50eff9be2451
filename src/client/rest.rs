use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{AppointmentSource, ClientError};
use crate::models::{decode_records, Appointment, Role};
use crate::session::Session;

/// Default request timeout for backend calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// REST client for the appointment backend.
///
/// `base_url` includes the API prefix, e.g. `http://localhost:8081/api`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
    token: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub role: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Fields a caller supplies when creating or updating an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub patient_id: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(rename = "type")]
    pub appointment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            token: None,
        })
    }

    /// Attach a bearer token to every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Auth ────────────────────────────────────────────────

    /// Sign in and build the session. The returned session carries the
    /// access token; pass it to [`ApiClient::with_token`] for later calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let req = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let login: LoginResponse = self.fetch_json(req).await?;

        let role = Role::from_backend(&login.role)
            .map_err(|_| ClientError::UnknownRole(login.role.clone()))?;
        tracing::info!(role = role.as_str(), "Signed in against backend");

        Ok(Session {
            user_id: email.to_string(),
            email: email.to_string(),
            role,
            patient_id: None,
            access_token: login.access_token,
        })
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.execute(self.request(Method::POST, "/auth/logout"))
            .await
            .map(|_| ())
    }

    // ── Appointments ────────────────────────────────────────

    pub async fn list(&self) -> Result<Vec<Appointment>, ClientError> {
        self.fetch_records(self.request(Method::GET, "/appointments"))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Appointment, ClientError> {
        self.fetch_json(self.request(Method::GET, &format!("/appointments/{id}")))
            .await
    }

    pub async fn by_patient(&self, patient_id: &str) -> Result<Vec<Appointment>, ClientError> {
        self.fetch_records(self.request(Method::GET, &format!("/appointments/patient/{patient_id}")))
            .await
    }

    pub async fn by_doctor(&self, doctor_id: &str) -> Result<Vec<Appointment>, ClientError> {
        self.fetch_records(self.request(Method::GET, &format!("/appointments/doctor/{doctor_id}")))
            .await
    }

    pub async fn create(&self, draft: &AppointmentDraft) -> Result<Appointment, ClientError> {
        let req = self.request(Method::POST, "/appointments").json(draft);
        self.fetch_json(req).await
    }

    pub async fn update(&self, id: &str, draft: &AppointmentDraft) -> Result<Appointment, ClientError> {
        let req = self
            .request(Method::PUT, &format!("/appointments/{id}"))
            .json(draft);
        self.fetch_json(req).await
    }

    pub async fn cancel(&self, id: &str) -> Result<Appointment, ClientError> {
        self.fetch_json(self.request(Method::PUT, &format!("/appointments/{id}/cancel")))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, &format!("/appointments/{id}")))
            .await
            .map(|_| ())
    }

    // ── Plumbing ────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        let response = req.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), %message, "Backend request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let response = self.execute(req).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::ResponseParsing(e.to_string())
            }
        })
    }

    /// A list endpoint, decoded record by record.
    async fn fetch_records(&self, req: RequestBuilder) -> Result<Vec<Appointment>, ClientError> {
        let values: Vec<serde_json::Value> = self.fetch_json(req).await?;
        Ok(decode_records(values))
    }
}

impl AppointmentSource for ApiClient {
    async fn fetch_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        self.list().await
    }

    fn describe(&self) -> String {
        format!("backend {}", self.base_url)
    }
}

/// Message for a non-2xx response: the body's `message` field when the body
/// is JSON and has one, a generic status line when it is JSON without one,
/// and "Request failed" when it is not JSON at all.
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! status: {status}")),
        Err(_) => "Request failed".to_string(),
    }
}
