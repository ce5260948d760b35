//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::client::{KubernsApi, KubernsClient, Session};
use crate::config::{Config, DEFAULT_USER_ID};
use crate::error::Result;

/// Run the init command
///
/// Prompts for the API token and owner user id, verifies access by listing
/// applications, and saves the configuration. A custom API host can be set
/// via `--api-host` or edited into the config file afterwards.
pub async fn run(config_path: Option<&str>, api_host: Option<String>) -> Result<()> {
    println!("{}", "Welcome to Kuberns!".bold().green());
    println!("Let's set up your deployment configuration.\n");

    let token: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your Kuberns API token")
        .interact()?;

    let user_id: i64 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Owner user id")
        .default(DEFAULT_USER_ID)
        .interact_text()?;

    // Verify the token by listing applications
    println!("\n{}", "Checking your access...".cyan());
    let session = Session {
        token: Some(token.clone()),
        user_id,
    };
    let client = KubernsClient::with_host(session, api_host.clone())?;
    let apps = client.list_apps().await?;
    println!("{}", "✓ Access verified!".green());
    if !apps.is_empty() {
        println!("Found {} existing application(s).", apps.len());
    }

    let config = Config {
        token: Some(token),
        user_id: Some(user_id),
        api_host,
        preferences: Default::default(),
    };
    config.save_at(config_path)?;

    let saved_path = Config::resolve_path(config_path)?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        saved_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "kuberns status".cyan());
    println!("  {} - List your applications", "kuberns app list".cyan());
    println!(
        "  {} - Create and deploy a new application",
        "kuberns app create".cyan()
    );

    Ok(())
}
