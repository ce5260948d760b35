//! Kuberns API client

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;

pub mod kuberns;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use kuberns::KubernsClient;
#[cfg(test)]
pub use mock::MockKubernsClient;
pub use models::{
    DeployCredentials, DeploymentAck, DeploymentRequest, EnvVar, LogEntry, NewWebApp, Plan, WebApp,
};

/// Session context injected into the client at construction.
///
/// Carries the persisted auth token and owner id explicitly instead of the
/// client reading them from ambient storage.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Bearer token attached to requests when present
    pub token: Option<String>,
    /// Owner user id for created applications
    pub user_id: i64,
}

impl Session {
    pub fn from_config(config: &Config) -> Self {
        Self {
            token: config.token.clone(),
            user_id: config.owner_id(),
        }
    }
}

/// Kuberns API operations
#[async_trait]
pub trait KubernsApi: Send + Sync {
    /// Create an application record, returning it with its server-assigned id
    async fn create_app(&self, app: &NewWebApp) -> Result<WebApp>;

    /// List all applications
    async fn list_apps(&self) -> Result<Vec<WebApp>>;

    /// Fetch a single application by id
    async fn get_app(&self, app_id: i64) -> Result<WebApp>;

    /// Obtain a short-lived credential pair for deploying an application
    async fn issue_deploy_credentials(&self, webapp_id: i64) -> Result<DeployCredentials>;

    /// Trigger a deployment of a previously created application
    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentAck>;

    /// Fetch deployment logs for an instance, normalized to a sequence
    async fn fetch_logs(&self, instance_id: i64) -> Result<Vec<LogEntry>>;
}
