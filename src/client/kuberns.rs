//! Kuberns API client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde::Serialize;

use super::models::{
    DeployCredentials, DeploymentAck, DeploymentRequest, LogEntry, LogsResponse, NewWebApp, WebApp,
};
use super::{KubernsApi, Session};
use crate::error::{ApiError, Error, Result};

/// Kuberns API base URL
const API_BASE_URL: &str = "https://api.kuberns.com/api";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for the idempotent log fetch
const LOG_FETCH_ATTEMPTS: u32 = 3;

/// Initial backoff between log fetch attempts, doubled each retry
const LOG_FETCH_BACKOFF: Duration = Duration::from_millis(500);

/// Kuberns API client
pub struct KubernsClient {
    http: HttpClient,
    base_url: String,
    session: Session,
}

impl KubernsClient {
    /// Create a new client against the production API
    pub fn new(session: Session) -> Result<Self> {
        Self::with_host(session, None)
    }

    /// Create a new client, optionally overriding the API host (dev/test)
    pub fn with_host(session: Session, host: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let base_url = match host {
            Some(host) => format!("{}/api", host.trim_end_matches('/')),
            None => API_BASE_URL.to_string(),
        };

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        log::debug!("GET {}{}", self.base_url, path);
        let request = self.authorize(self.http.get(format!("{}{}", self.base_url, path)));
        let response = request.send().await.map_err(ApiError::from)?;
        Self::handle_response(response).await
    }

    async fn post<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        log::debug!("POST {}{}", self.base_url, path);
        let request = self.authorize(self.http.post(format!("{}{}", self.base_url, path)));
        let response = request.json(body).send().await.map_err(ApiError::from)?;
        Self::handle_response(response).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        match status {
            status if status.is_success() => {
                let data = response.json::<T>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(data)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let msg = Self::error_message(response, "Resource not found").await;
                Err(ApiError::NotFound(msg).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let msg = Self::error_message(response, "Bad request").await;
                Err(ApiError::BadRequest(msg).into())
            }
            status if status.is_server_error() => {
                let msg = Self::error_message(response, &format!("Server error: {}", status)).await;
                Err(ApiError::ServerError(msg).into())
            }
            _ => {
                let msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(msg).into())
            }
        }
    }

    /// Extract the server-provided error payload, falling back to a generic
    /// message. The API reports errors as `{"detail": "..."}`.
    async fn error_message(response: reqwest::Response, fallback: &str) -> String {
        #[derive(Deserialize)]
        struct ErrorBody {
            detail: String,
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
            return parsed.detail;
        }
        if body.trim().is_empty() {
            fallback.to_string()
        } else {
            body
        }
    }

    fn is_retryable(err: &Error) -> bool {
        matches!(
            err,
            Error::Api(ApiError::Network(_)) | Error::Api(ApiError::ServerError(_))
        )
    }
}

#[async_trait]
impl KubernsApi for KubernsClient {
    async fn create_app(&self, app: &NewWebApp) -> Result<WebApp> {
        self.post("/webapps/", app).await
    }

    async fn list_apps(&self) -> Result<Vec<WebApp>> {
        self.get("/webapps/").await
    }

    async fn get_app(&self, app_id: i64) -> Result<WebApp> {
        self.get(&format!("/webapps/{}/", app_id)).await
    }

    async fn issue_deploy_credentials(&self, webapp_id: i64) -> Result<DeployCredentials> {
        #[derive(Serialize)]
        struct CredentialRequest {
            webapp_id: i64,
        }

        self.post("/deployments/credentials/", &CredentialRequest { webapp_id })
            .await
    }

    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentAck> {
        // POSTs are never retried, a duplicate submission would trigger a
        // second deployment
        self.post("/deployments/", request).await
    }

    async fn fetch_logs(&self, instance_id: i64) -> Result<Vec<LogEntry>> {
        let path = format!("/deployments/{}/logs/", instance_id);

        // Idempotent GET: bounded retry with exponential backoff
        let mut backoff = LOG_FETCH_BACKOFF;
        let mut attempt = 1;
        loop {
            match self.get::<LogsResponse>(&path).await {
                Ok(logs) => return Ok(logs.into_vec()),
                Err(err) if attempt < LOG_FETCH_ATTEMPTS && Self::is_retryable(&err) => {
                    log::debug!(
                        "log fetch attempt {}/{} failed: {}",
                        attempt,
                        LOG_FETCH_ATTEMPTS,
                        err
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
