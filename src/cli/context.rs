//! Command execution context
//!
//! Bundles the loaded config, the API client, and the output format so
//! handlers don't repeat the loading/validation boilerplate. The client
//! receives the session context explicitly at construction; nothing reads
//! token or user id from ambient storage afterwards.

use std::sync::Arc;

use clap::ValueEnum;

use crate::cli::OutputFormat;
use crate::client::{KubernsClient, Session};
use crate::config::Config;
use crate::error::Result;

/// Context for command execution
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// API client carrying the injected session (Arc so the poller can share it)
    pub client: Arc<KubernsClient>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load config, validate auth, and build the client.
    ///
    /// Host resolution: `--api-host`/env override beats the config file,
    /// which beats the production default. Output format resolves the same
    /// way: flag/env, then the persisted preference, then table.
    pub fn new(
        format: Option<OutputFormat>,
        config_path: Option<&str>,
        api_host: Option<String>,
    ) -> Result<Self> {
        let config = Config::load_at(config_path)?;
        config.validate_auth()?;

        let format = format
            .or_else(|| {
                config
                    .preferences
                    .format
                    .as_deref()
                    .and_then(|name| OutputFormat::from_str(name, true).ok())
            })
            .unwrap_or(OutputFormat::Table);

        let session = Session::from_config(&config);
        let host = api_host.or_else(|| config.api_host.clone());
        let client = Arc::new(KubernsClient::with_host(session, host)?);

        Ok(Self {
            config,
            client,
            format,
        })
    }
}
