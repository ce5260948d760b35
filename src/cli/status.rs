//! Status command implementation

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "Kuberns Configuration Status".bold());

    match Config::load_at(config_path) {
        Ok(config) => {
            let path = Config::resolve_path(config_path)?;
            println!("Config file: {}", path.display().to_string().cyan());
            println!();

            if config.token.is_some() {
                println!("{} API token configured", "✓".green());
            } else {
                println!("{} API token not configured", "✗".red());
                println!("  → Run 'kuberns init' to configure");
            }

            match config.user_id {
                Some(user_id) => println!("{} Owner user id: {}", "✓".green(), user_id),
                None => println!(
                    "{} No owner user id set (using development default {})",
                    "⚠".yellow(),
                    config.owner_id()
                ),
            }

            if let Some(ref host) = config.api_host {
                println!("{} API host override: {}", "○".dimmed(), host);
            }
        }
        Err(_) => {
            println!("{} No configuration found", "✗".red());
            println!("  → Run 'kuberns init' to get started");
        }
    }

    Ok(())
}
