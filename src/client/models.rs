//! Request and response models for the Kuberns API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pricing plan for an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Starter,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Starter => "starter",
            Plan::Pro => "pro",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment variable payload item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

/// Application creation request body (step-1 submission)
///
/// The server resolves the owner from `user_id`, so the owner field is
/// serialized under that name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWebApp {
    pub name: String,
    pub region: String,
    pub framework: String,
    pub plan_type: Plan,
    pub repo_org: String,
    pub repo_name: String,
    pub repo_branch: String,
    #[serde(rename = "user_id")]
    pub owner: i64,
    pub env_vars: Vec<EnvVar>,
}

/// Application record as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebApp {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub framework: String,
    pub plan_type: Plan,
    pub repo_org: String,
    pub repo_name: String,
    pub repo_branch: String,
}

/// Deployment trigger request body (step-2 submission)
///
/// One-shot: built from the created application id plus step-2 fields and
/// dropped after submission. The credential pair comes from a short-lived
/// server-issued grant, never from values stored client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub webapp_id: i64,
    pub port: u16,
    pub env_vars: Vec<EnvVar>,
    pub aws_access_key: String,
    pub aws_secret_key: String,
}

/// Acknowledgment returned when a deployment is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentAck {
    pub message: String,
    pub instance_id: i64,
}

/// Short-lived deployment credentials issued by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub expires_at: DateTime<Utc>,
}

/// A single deployment log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// The logs endpoint returns either a single entry or a sequence; callers
/// always see a sequence.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LogsResponse {
    Many(Vec<LogEntry>),
    One(LogEntry),
}

impl LogsResponse {
    pub fn into_vec(self) -> Vec<LogEntry> {
        match self {
            LogsResponse::Many(entries) => entries,
            LogsResponse::One(entry) => vec![entry],
        }
    }
}
