//! Mock Kuberns API client for testing
//!
//! Provides a mock implementation of `KubernsApi` for unit testing the
//! wizard controller and poller without network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::models::{
    DeployCredentials, DeploymentAck, DeploymentRequest, LogEntry, NewWebApp, WebApp,
};
use super::KubernsApi;
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure responses via builder methods, then inspect captured requests
/// and call counts after exercising the code under test. Locks are plain
/// mutexes and are never held across an await.
pub struct MockKubernsClient {
    /// Applications returned from list_apps/get_app
    apps: Arc<Mutex<Vec<WebApp>>>,
    /// Record returned from create_app; synthesized from the request if unset
    created_app: Arc<Mutex<Option<WebApp>>>,
    /// Ack returned from deploy
    ack: Arc<Mutex<DeploymentAck>>,
    /// Credentials returned from issue_deploy_credentials
    credentials: Arc<Mutex<DeployCredentials>>,
    /// Log snapshot returned from each fetch_logs call
    logs: Arc<Mutex<Vec<LogEntry>>>,
    /// Error to return from the next call of any operation - consumed on use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Number of upcoming fetch_logs calls that fail with a network error
    failing_log_fetches: Arc<Mutex<usize>>,
    /// Captured create_app request bodies
    created_requests: Arc<Mutex<Vec<NewWebApp>>>,
    /// Captured deploy request bodies
    deploy_requests: Arc<Mutex<Vec<DeploymentRequest>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub create_app: usize,
    pub list_apps: usize,
    pub get_app: usize,
    pub issue_deploy_credentials: usize,
    pub deploy: usize,
    pub fetch_logs: usize,
}

impl Default for MockKubernsClient {
    fn default() -> Self {
        Self {
            apps: Arc::new(Mutex::new(Vec::new())),
            created_app: Arc::new(Mutex::new(None)),
            ack: Arc::new(Mutex::new(DeploymentAck {
                message: "Deployment started".to_string(),
                instance_id: 1,
            })),
            credentials: Arc::new(Mutex::new(DeployCredentials {
                access_key: "mock-access-key".to_string(),
                secret_key: "mock-secret-key".to_string(),
                expires_at: Utc::now() + Duration::minutes(15),
            })),
            logs: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
            failing_log_fetches: Arc::new(Mutex::new(0)),
            created_requests: Arc::new(Mutex::new(Vec::new())),
            deploy_requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
        }
    }
}

impl MockKubernsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apps(self, apps: Vec<WebApp>) -> Self {
        *self.apps.lock().unwrap() = apps;
        self
    }

    pub fn with_created_app(self, app: WebApp) -> Self {
        *self.created_app.lock().unwrap() = Some(app);
        self
    }

    pub fn with_ack(self, ack: DeploymentAck) -> Self {
        *self.ack.lock().unwrap() = ack;
        self
    }

    pub fn with_logs(self, logs: Vec<LogEntry>) -> Self {
        *self.logs.lock().unwrap() = logs;
        self
    }

    pub fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_failing_log_fetches(self, count: usize) -> Self {
        *self.failing_log_fetches.lock().unwrap() = count;
        self
    }

    /// Replace the log snapshot returned by subsequent fetches
    pub fn set_logs(&self, logs: Vec<LogEntry>) {
        *self.logs.lock().unwrap() = logs;
    }

    /// Fail the next call of any operation with the given error
    pub fn set_error(&self, error: ApiError) {
        *self.error.lock().unwrap() = Some(error);
    }

    pub fn call_counts(&self) -> CallCounts {
        self.call_count.lock().unwrap().clone()
    }

    pub fn captured_creates(&self) -> Vec<NewWebApp> {
        self.created_requests.lock().unwrap().clone()
    }

    pub fn captured_deploys(&self) -> Vec<DeploymentRequest> {
        self.deploy_requests.lock().unwrap().clone()
    }

    fn take_error(&self) -> Option<ApiError> {
        self.error.lock().unwrap().take()
    }
}

#[async_trait]
impl KubernsApi for MockKubernsClient {
    async fn create_app(&self, app: &NewWebApp) -> Result<WebApp> {
        self.call_count.lock().unwrap().create_app += 1;
        self.created_requests.lock().unwrap().push(app.clone());
        if let Some(err) = self.take_error() {
            return Err(err.into());
        }

        let configured = self.created_app.lock().unwrap().clone();
        Ok(configured.unwrap_or(WebApp {
            id: 1,
            name: app.name.clone(),
            region: app.region.clone(),
            framework: app.framework.clone(),
            plan_type: app.plan_type,
            repo_org: app.repo_org.clone(),
            repo_name: app.repo_name.clone(),
            repo_branch: app.repo_branch.clone(),
        }))
    }

    async fn list_apps(&self) -> Result<Vec<WebApp>> {
        self.call_count.lock().unwrap().list_apps += 1;
        if let Some(err) = self.take_error() {
            return Err(err.into());
        }
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn get_app(&self, app_id: i64) -> Result<WebApp> {
        self.call_count.lock().unwrap().get_app += 1;
        if let Some(err) = self.take_error() {
            return Err(err.into());
        }
        self.apps
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == app_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Application {}", app_id)).into())
    }

    async fn issue_deploy_credentials(&self, _webapp_id: i64) -> Result<DeployCredentials> {
        self.call_count.lock().unwrap().issue_deploy_credentials += 1;
        if let Some(err) = self.take_error() {
            return Err(err.into());
        }
        Ok(self.credentials.lock().unwrap().clone())
    }

    async fn deploy(&self, request: &DeploymentRequest) -> Result<DeploymentAck> {
        self.call_count.lock().unwrap().deploy += 1;
        self.deploy_requests.lock().unwrap().push(request.clone());
        if let Some(err) = self.take_error() {
            return Err(err.into());
        }
        Ok(self.ack.lock().unwrap().clone())
    }

    async fn fetch_logs(&self, _instance_id: i64) -> Result<Vec<LogEntry>> {
        self.call_count.lock().unwrap().fetch_logs += 1;
        {
            let mut failing = self.failing_log_fetches.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(ApiError::Network("mock log fetch failure".to_string()).into());
            }
        }
        if let Some(err) = self.take_error() {
            return Err(err.into());
        }
        Ok(self.logs.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Plan;
    use crate::error::Error;

    fn app(id: i64, name: &str) -> WebApp {
        WebApp {
            id,
            name: name.to_string(),
            region: "us-west-2".to_string(),
            framework: "React".to_string(),
            plan_type: Plan::Starter,
            repo_org: "Orlhub".to_string(),
            repo_name: "Repo 1".to_string(),
            repo_branch: "main".to_string(),
        }
    }

    #[tokio::test]
    async fn test_configured_apps_are_listed_and_looked_up() {
        let client = MockKubernsClient::new().with_apps(vec![app(1, "one"), app(2, "two")]);

        let listed = client.list_apps().await.unwrap();
        assert_eq!(listed.len(), 2);

        let found = client.get_app(2).await.unwrap();
        assert_eq!(found.name, "two");

        let missing = client.get_app(99).await.unwrap_err();
        assert!(matches!(missing, Error::Api(ApiError::NotFound(_))));

        let counts = client.call_counts();
        assert_eq!(counts.list_apps, 1);
        assert_eq!(counts.get_app, 2);
    }

    #[tokio::test]
    async fn test_configured_ack_is_returned() {
        let client = MockKubernsClient::new().with_ack(DeploymentAck {
            message: "queued".to_string(),
            instance_id: 17,
        });

        let request = DeploymentRequest {
            webapp_id: 1,
            port: 3000,
            env_vars: Vec::new(),
            aws_access_key: "k".to_string(),
            aws_secret_key: "s".to_string(),
        };
        let ack = client.deploy(&request).await.unwrap();
        assert_eq!(ack.instance_id, 17);
        assert_eq!(client.captured_deploys().len(), 1);
    }
}
