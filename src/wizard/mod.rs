//! Two-step application creation wizard
//!
//! `WizardSession` owns the form state for both steps, the created
//! application record, and the shared loading/error flags. Step views (the
//! interactive CLI) read and mutate the forms, then drive submission
//! through the session so the step transition rules live in one place.

use std::sync::Arc;

use crate::client::{DeploymentAck, DeploymentRequest, KubernsApi, NewWebApp, WebApp};
use crate::error::{Error, Result};

pub mod form;
pub mod poller;

pub use form::{EnvVarRow, Step1Form, Step2Form, DEFAULT_PORT};
pub use poller::{DeployState, LogWatcher, POLL_INTERVAL};

/// Wizard step index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Step1,
    Step2,
}

/// State for one wizard session: exactly one application draft at a time.
pub struct WizardSession<C> {
    client: Arc<C>,
    owner: i64,
    pub step1: Step1Form,
    pub step2: Step2Form,
    step: WizardStep,
    draft: Option<WebApp>,
    loading: bool,
    last_error: Option<String>,
}

impl<C: KubernsApi> WizardSession<C> {
    pub fn new(client: Arc<C>, owner: i64) -> Self {
        Self {
            client,
            owner,
            step1: Step1Form::default(),
            step2: Step2Form::default(),
            step: WizardStep::Step1,
            draft: None,
            loading: false,
            last_error: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// The created application record, present after a successful step 1
    pub fn draft(&self) -> Option<&WebApp> {
        self.draft.as_ref()
    }

    pub fn draft_id(&self) -> Option<i64> {
        self.draft.as_ref().map(|app| app.id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last submission error, shown as a dismissible banner by the step view
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Whether the step-1 submit action is currently allowed
    pub fn can_submit_step1(&self) -> bool {
        !self.loading && self.step1.can_submit()
    }

    /// Create the application from step-1 fields and advance to step 2.
    ///
    /// On failure the error is recorded and the session stays on step 1; the
    /// submission remains retryable. Validation-gate rejections do not set
    /// the error banner.
    pub async fn submit_step1(&mut self) -> Result<()> {
        if self.loading {
            return Err(Error::Other("a submission is already in flight".to_string()));
        }
        if !self.step1.can_submit() {
            return Err(Error::Other(
                "app name, region and framework are required".to_string(),
            ));
        }

        let request = NewWebApp {
            name: self.step1.name.clone(),
            region: self.step1.region.clone(),
            framework: self.step1.framework.clone(),
            plan_type: self.step1.plan(),
            repo_org: self.step1.repo_org.clone(),
            repo_name: self.step1.repo_name.clone(),
            repo_branch: self.step1.repo_branch.clone(),
            owner: self.owner,
            env_vars: Vec::new(),
        };

        self.loading = true;
        self.last_error = None;
        let result = self.client.create_app(&request).await;
        self.loading = false;

        match result {
            Ok(record) => {
                self.draft = Some(record);
                self.step = WizardStep::Step2;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Trigger a deployment from the draft id and step-2 fields.
    ///
    /// Obtains short-lived deploy credentials, posts the deployment request,
    /// and returns the acknowledgment so the caller can start tailing logs.
    /// No rollback of the created application on failure; the remote system
    /// owns that state.
    pub async fn submit_step2(&mut self) -> Result<DeploymentAck> {
        if self.loading {
            return Err(Error::Other("a submission is already in flight".to_string()));
        }
        let webapp_id = self
            .draft_id()
            .ok_or_else(|| Error::Other("no application has been created yet".to_string()))?;
        let port: u16 = self
            .step2
            .port
            .trim()
            .parse()
            .map_err(|_| Error::Other(format!("invalid port: {}", self.step2.port)))?;

        let env_vars = self.step2.enabled_vars();
        let client = Arc::clone(&self.client);

        self.loading = true;
        self.last_error = None;
        let outcome = async {
            let credentials = client.issue_deploy_credentials(webapp_id).await?;
            let request = DeploymentRequest {
                webapp_id,
                port,
                env_vars,
                aws_access_key: credentials.access_key,
                aws_secret_key: credentials.secret_key,
            };
            client.deploy(&request).await
        }
        .await;
        self.loading = false;

        match outcome {
            Ok(ack) => Ok(ack),
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Return to step 1 without clearing the draft or any field values
    pub fn go_back(&mut self) {
        self.step = WizardStep::Step1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{EnvVar, MockKubernsClient, Plan, WebApp};
    use crate::error::ApiError;

    fn filled_step1() -> Step1Form {
        Step1Form {
            repo_org: "Orlhub".to_string(),
            repo_name: "Repo 1".to_string(),
            repo_branch: "main".to_string(),
            name: "demo".to_string(),
            region: "us-west-2".to_string(),
            framework: "React".to_string(),
            plan: Some(Plan::Starter),
        }
    }

    fn server_record(id: i64) -> WebApp {
        WebApp {
            id,
            name: "demo".to_string(),
            region: "us-west-2".to_string(),
            framework: "React".to_string(),
            plan_type: Plan::Starter,
            repo_org: "Orlhub".to_string(),
            repo_name: "Repo 1".to_string(),
            repo_branch: "main".to_string(),
        }
    }

    #[tokio::test]
    async fn test_step1_validation_gate_makes_no_network_call() {
        let client = Arc::new(MockKubernsClient::new());
        let mut session = WizardSession::new(Arc::clone(&client), 1);

        assert!(!session.can_submit_step1());
        let result = session.submit_step1().await;

        assert!(result.is_err());
        assert_eq!(client.call_counts().create_app, 0);
        assert_eq!(session.step(), WizardStep::Step1);
        // Gate rejections are silent: no banner
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_step1_success_advances_with_server_id() {
        let client = Arc::new(MockKubernsClient::new().with_created_app(server_record(42)));
        let mut session = WizardSession::new(Arc::clone(&client), 1);
        session.step1 = filled_step1();

        session.submit_step1().await.unwrap();

        assert_eq!(session.step(), WizardStep::Step2);
        assert_eq!(session.draft_id(), Some(42));

        // Exactly the step-1 fields plus the owner id were posted
        let posted = client.captured_creates();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].name, "demo");
        assert_eq!(posted[0].region, "us-west-2");
        assert_eq!(posted[0].framework, "React");
        assert_eq!(posted[0].plan_type, Plan::Starter);
        assert_eq!(posted[0].repo_org, "Orlhub");
        assert_eq!(posted[0].repo_name, "Repo 1");
        assert_eq!(posted[0].repo_branch, "main");
        assert_eq!(posted[0].owner, 1);
        assert!(posted[0].env_vars.is_empty());
    }

    #[tokio::test]
    async fn test_step1_failure_records_error_and_stays() {
        let client = Arc::new(
            MockKubernsClient::new().with_error(ApiError::BadRequest("Invalid user_id".to_string())),
        );
        let mut session = WizardSession::new(Arc::clone(&client), 999);
        session.step1 = filled_step1();

        let result = session.submit_step1().await;

        assert!(result.is_err());
        assert_eq!(session.step(), WizardStep::Step1);
        assert!(session.draft().is_none());
        assert!(session.last_error().unwrap().contains("Invalid user_id"));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_step1_retry_after_failure_clears_banner() {
        let client = Arc::new(
            MockKubernsClient::new()
                .with_created_app(server_record(7))
                .with_error(ApiError::Network("Connection refused".to_string())),
        );
        let mut session = WizardSession::new(Arc::clone(&client), 1);
        session.step1 = filled_step1();

        assert!(session.submit_step1().await.is_err());
        assert!(session.last_error().is_some());

        // Error was consumed; re-pressing submit succeeds
        session.submit_step1().await.unwrap();
        assert!(session.last_error().is_none());
        assert_eq!(session.draft_id(), Some(7));
    }

    #[tokio::test]
    async fn test_step2_payload_filters_rows_and_parses_port() {
        let client = Arc::new(MockKubernsClient::new().with_created_app(server_record(42)));
        let mut session = WizardSession::new(Arc::clone(&client), 1);
        session.step1 = filled_step1();
        session.submit_step1().await.unwrap();

        session.step2 = Step2Form::with_rows(vec![
            EnvVarRow::new("A", "1"),
            EnvVarRow::new("B", "2"),
        ]);
        session.step2.toggle_row(1);
        session.step2.port = "8080".to_string();

        let ack = session.submit_step2().await.unwrap();
        assert_eq!(ack.instance_id, 1);

        let deploys = client.captured_deploys();
        assert_eq!(deploys.len(), 1);
        assert_eq!(deploys[0].webapp_id, 42);
        assert_eq!(deploys[0].port, 8080);
        assert_eq!(
            deploys[0].env_vars,
            vec![EnvVar {
                key: "A".to_string(),
                value: "1".to_string(),
            }]
        );
        // Credentials came from the server-issued short-lived grant
        assert_eq!(client.call_counts().issue_deploy_credentials, 1);
        assert_eq!(deploys[0].aws_access_key, "mock-access-key");
    }

    #[tokio::test]
    async fn test_step2_without_draft_is_rejected() {
        let client = Arc::new(MockKubernsClient::new());
        let mut session = WizardSession::new(Arc::clone(&client), 1);

        let result = session.submit_step2().await;

        assert!(result.is_err());
        assert_eq!(client.call_counts().deploy, 0);
        assert_eq!(client.call_counts().issue_deploy_credentials, 0);
    }

    #[tokio::test]
    async fn test_step2_invalid_port_is_rejected_without_network_call() {
        let client = Arc::new(MockKubernsClient::new().with_created_app(server_record(42)));
        let mut session = WizardSession::new(Arc::clone(&client), 1);
        session.step1 = filled_step1();
        session.submit_step1().await.unwrap();

        session.step2.port = "not-a-port".to_string();
        let result = session.submit_step2().await;

        assert!(result.is_err());
        assert_eq!(client.call_counts().deploy, 0);
    }

    #[tokio::test]
    async fn test_step2_failure_records_error_and_does_not_advance() {
        let client = Arc::new(MockKubernsClient::new().with_created_app(server_record(42)));
        let mut session = WizardSession::new(Arc::clone(&client), 1);
        session.step1 = filled_step1();
        session.submit_step1().await.unwrap();

        client.set_error(ApiError::ServerError("deploy engine down".to_string()));
        let result = session.submit_step2().await;

        assert!(result.is_err());
        assert_eq!(session.step(), WizardStep::Step2);
        assert!(session.last_error().unwrap().contains("deploy engine down"));
        // The draft is kept, a retry stays possible
        assert_eq!(session.draft_id(), Some(42));
    }

    #[tokio::test]
    async fn test_go_back_keeps_draft_and_fields() {
        let client = Arc::new(MockKubernsClient::new().with_created_app(server_record(42)));
        let mut session = WizardSession::new(Arc::clone(&client), 1);
        session.step1 = filled_step1();
        session.submit_step1().await.unwrap();

        session.go_back();

        assert_eq!(session.step(), WizardStep::Step1);
        assert_eq!(session.draft_id(), Some(42));
        assert_eq!(session.step1.name, "demo");
    }
}
