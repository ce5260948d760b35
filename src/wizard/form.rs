//! Editable field state backing the two wizard steps
//!
//! Plain value types with set/get semantics; all row operations replace the
//! full ordered sequence, no structural sharing.

use crate::client::{EnvVar, Plan};

/// Default port preselected for step 2
pub const DEFAULT_PORT: &str = "3000";

/// Step-1 fields: repository selection plus application details
#[derive(Debug, Clone, Default)]
pub struct Step1Form {
    pub repo_org: String,
    pub repo_name: String,
    pub repo_branch: String,
    pub name: String,
    pub region: String,
    pub framework: String,
    pub plan: Option<Plan>,
}

impl Step1Form {
    /// Presence gate for the step-1 submit action.
    ///
    /// App name, region and framework must be non-empty; no cross-field
    /// validation beyond that.
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.region.trim().is_empty()
            && !self.framework.trim().is_empty()
    }

    pub fn plan(&self) -> Plan {
        self.plan.unwrap_or(Plan::Starter)
    }
}

/// One editable environment variable row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVarRow {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl EnvVarRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    fn empty() -> Self {
        Self::new("", "")
    }
}

/// Step-2 fields: port plus the ordered environment variable rows
#[derive(Debug, Clone)]
pub struct Step2Form {
    pub port: String,
    rows: Vec<EnvVarRow>,
}

impl Default for Step2Form {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            rows: Vec::new(),
        }
    }
}

impl Step2Form {
    pub fn with_rows(rows: Vec<EnvVarRow>) -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            rows,
        }
    }

    pub fn rows(&self) -> &[EnvVarRow] {
        &self.rows
    }

    /// Append an empty enabled row
    pub fn add_row(&mut self) {
        self.rows.push(EnvVarRow::empty());
    }

    /// Remove the row at `index`, shifting subsequent rows up
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    /// Update the key of a single row by position
    pub fn set_key(&mut self, index: usize, key: impl Into<String>) {
        if let Some(row) = self.rows.get_mut(index) {
            row.key = key.into();
        }
    }

    /// Update the value of a single row by position
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(row) = self.rows.get_mut(index) {
            row.value = value.into();
        }
    }

    /// Flip the enabled flag of a single row by position
    pub fn toggle_row(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.enabled = !row.enabled;
        }
    }

    /// Rows included in the deployment payload: enabled with a non-empty
    /// key, in input order. Keys are not deduplicated.
    pub fn enabled_vars(&self) -> Vec<EnvVar> {
        self.rows
            .iter()
            .filter(|row| row.enabled && !row.key.is_empty())
            .map(|row| EnvVar {
                key: row.key.clone(),
                value: row.value.clone(),
            })
            .collect()
    }
}
