//! CLI command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};

pub mod app;
pub mod context;
pub mod init;
pub mod logs;
pub mod status;

pub use context::CommandContext;

/// Output format for list-style commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Kuberns CLI - companion for the Kuberns deployment platform
#[derive(Parser, Debug)]
#[command(name = "kuberns")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(long, global = true, env = "KUBERNS_FORMAT", hide_env = true)]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "KUBERNS_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Custom API host for development/testing
    #[arg(long, global = true, env = "KUBERNS_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "KUBERNS_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Kuberns configuration
    Init,

    /// Show authentication and configuration status
    Status,

    /// Display version information
    Version,

    /// Manage applications
    #[command(subcommand)]
    App(AppCommands),

    /// View deployment logs for an instance
    Logs {
        /// Instance id whose logs to fetch
        instance_id: i64,

        /// Keep polling until the deployment reaches a terminal state
        #[arg(long, short = 'f')]
        follow: bool,
    },
}

/// Application management subcommands
#[derive(Subcommand, Debug)]
pub enum AppCommands {
    /// List all applications
    List,

    /// Show a single application
    Get {
        /// Application id
        app_id: i64,
    },

    /// Create and deploy a new application (interactive two-step wizard)
    Create,
}
