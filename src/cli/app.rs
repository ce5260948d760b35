//! Application management commands, including the creation wizard

use std::sync::Arc;

use colored::Colorize;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{CommandContext, logs};
use crate::client::{KubernsApi, Plan, WebApp};
use crate::error::{Error, Result};
use crate::output::print_list;
use crate::wizard::poller::DeployState;
use crate::wizard::{EnvVarRow, Step1Form, Step2Form, WizardSession, WizardStep};

/// Selectable GitHub organizations
const GITHUB_ORGS: [&str; 3] = ["Adlib Naden T", "Auburnin Pagis", "Orlhub"];

/// Selectable repositories
const REPOSITORIES: [&str; 3] = ["Repo 1", "Repo 2", "Repo 3"];

/// Selectable branches
const BRANCHES: [&str; 3] = ["main", "develop", "feature"];

/// Deployment regions: display label and API value
const REGIONS: [(&str, &str); 4] = [
    ("US West (Oregon)", "us-west-2"),
    ("US East (Virginia)", "us-east-1"),
    ("Europe (Ireland)", "eu-west-1"),
    ("Asia Pacific (Singapore)", "ap-southeast-1"),
];

/// Supported frameworks/templates
const FRAMEWORKS: [&str; 5] = ["React", "Vue", "Angular", "Next.js", "Nuxt.js"];

/// Plan cards shown during selection
const PLAN_CHOICES: [(Plan, &str); 2] = [
    (
        Plan::Starter,
        "Starter - 1 vCPU, 2 GB RAM, 10 GB storage ($20/month)",
    ),
    (Plan::Pro, "Pro - 4 vCPU, 8 GB RAM, 50 GB storage ($80/month)"),
];

/// Display format for applications in table view
#[derive(Tabled, Serialize)]
struct AppDisplay {
    #[tabled(rename = "APP ID")]
    id: i64,

    #[tabled(rename = "NAME")]
    name: String,

    #[tabled(rename = "REGION")]
    region: String,

    #[tabled(rename = "FRAMEWORK")]
    framework: String,

    #[tabled(rename = "PLAN")]
    plan: String,

    #[tabled(rename = "REPOSITORY")]
    repository: String,
}

impl From<WebApp> for AppDisplay {
    fn from(app: WebApp) -> Self {
        Self {
            id: app.id,
            name: app.name,
            region: app.region,
            framework: app.framework,
            plan: app.plan_type.to_string(),
            repository: format!("{}/{}@{}", app.repo_org, app.repo_name, app.repo_branch),
        }
    }
}

/// Run the app list command
pub async fn list(ctx: &CommandContext) -> Result<()> {
    let apps = ctx.client.list_apps().await?;
    let display: Vec<AppDisplay> = apps.into_iter().map(Into::into).collect();
    print_list(&display, ctx.format)
}

/// Run the app get command
pub async fn get(ctx: &CommandContext, app_id: i64) -> Result<()> {
    let app = ctx.client.get_app(app_id).await?;
    let display = [AppDisplay::from(app)];
    print_list(&display, ctx.format)
}

/// Run the interactive two-step creation wizard
pub async fn create(ctx: &CommandContext) -> Result<()> {
    println!("{}", "Create New App".bold());
    println!("Connect your repository and fill in the requirements to see the app deployed in seconds.\n");
    println!("Status: {}", state_label(DeployState::Idle));

    let mut session = WizardSession::new(Arc::clone(&ctx.client), ctx.config.owner_id());
    session.step2 = Step2Form::with_rows(vec![
        EnvVarRow::new("API_URL", "https://api.example.com"),
        EnvVarRow::new("ENV", "production"),
    ]);

    loop {
        match session.step() {
            WizardStep::Step1 => {
                prompt_step1(&mut session.step1)?;

                // Presence gate mirrors the disabled submit button
                if !session.can_submit_step1() {
                    println!(
                        "{}",
                        "App name, region and framework are required.".yellow()
                    );
                    continue;
                }

                println!("\n{}", "Creating app...".cyan());
                if session.submit_step1().await.is_err() {
                    show_error_banner(&mut session);
                    if !retry_prompt("Retry creating the app?")? {
                        return Ok(());
                    }
                    continue;
                }

                let Some(draft) = session.draft() else {
                    return Err(Error::Other(
                        "no application record after step 1".to_string(),
                    ));
                };
                println!(
                    "{} Application {} created (id {}).\n",
                    "✓".green(),
                    draft.name.bold(),
                    draft.id
                );
            }
            WizardStep::Step2 => {
                match prompt_step2(&mut session.step2)? {
                    Step2Action::Deploy => {}
                    Step2Action::Back => {
                        session.go_back();
                        continue;
                    }
                    Step2Action::Cancel => return Ok(()),
                }

                println!("\n{}", "Starting deployment...".cyan());
                let ack = match session.submit_step2().await {
                    Ok(ack) => ack,
                    Err(_) => {
                        show_error_banner(&mut session);
                        println!("Status: {}", state_label(DeployState::Failed));
                        if !retry_prompt("Retry the deployment?")? {
                            return Ok(());
                        }
                        continue;
                    }
                };

                println!("{} (instance {})", ack.message, ack.instance_id);
                println!("Status: {}\n", state_label(DeployState::Deploying));

                let state = logs::tail(Arc::clone(&ctx.client), ack.instance_id).await?;
                println!("Status: {}", state_label(state));
                if state == DeployState::Deployed {
                    println!(
                        "\n{}",
                        "Deployment completed successfully! Your application is now live."
                            .green()
                            .bold()
                    );
                }
                return Ok(());
            }
        }
    }
}

fn state_label(state: DeployState) -> colored::ColoredString {
    match state {
        DeployState::Idle => "idle".dimmed(),
        DeployState::Deploying => "deploying".cyan(),
        DeployState::Deployed => "deployed".green(),
        DeployState::Failed => "failed".red(),
    }
}

/// Dismissible error banner: shown once, then cleared so a retry starts clean
fn show_error_banner<C: KubernsApi>(session: &mut WizardSession<C>) {
    if let Some(message) = session.last_error() {
        eprintln!("{} {}", "✗".red(), message.red());
    }
    session.clear_error();
}

fn retry_prompt(prompt: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(true)
        .interact()?)
}

fn select_from(prompt: &str, items: &[&str], current: &str) -> Result<String> {
    let default = items.iter().position(|i| *i == current).unwrap_or(0);
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()?;
    Ok(items[idx].to_string())
}

fn prompt_step1(form: &mut Step1Form) -> Result<()> {
    println!("{}", "GitHub Repository".bold());
    form.repo_org = select_from("Select organization", &GITHUB_ORGS, &form.repo_org)?;
    form.repo_name = select_from("Select repository", &REPOSITORIES, &form.repo_name)?;
    form.repo_branch = select_from("Select branch", &BRANCHES, &form.repo_branch)?;

    println!("\n{}", "App details".bold());
    form.name = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("App name")
        .with_initial_text(form.name.clone())
        .allow_empty(true)
        .interact_text()?;

    let region_labels: Vec<&str> = REGIONS.iter().map(|(label, _)| *label).collect();
    let current_region = REGIONS
        .iter()
        .position(|(_, value)| *value == form.region)
        .unwrap_or(0);
    let region_idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select region")
        .items(&region_labels)
        .default(current_region)
        .interact()?;
    form.region = REGIONS[region_idx].1.to_string();

    form.framework = select_from("Select template", &FRAMEWORKS, &form.framework)?;

    let plan_labels: Vec<&str> = PLAN_CHOICES.iter().map(|(_, label)| *label).collect();
    let current_plan = PLAN_CHOICES
        .iter()
        .position(|(plan, _)| Some(*plan) == form.plan)
        .unwrap_or(0);
    let plan_idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Plan type")
        .items(&plan_labels)
        .default(current_plan)
        .interact()?;
    form.plan = Some(PLAN_CHOICES[plan_idx].0);

    Ok(())
}

/// What the user chose to do at the end of step 2
enum Step2Action {
    Deploy,
    Back,
    Cancel,
}

/// Display format for env var rows in the editor
#[derive(Tabled)]
struct EnvRowDisplay {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ON")]
    enabled: &'static str,
    #[tabled(rename = "KEY")]
    key: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

fn print_env_rows(form: &Step2Form) {
    let rows: Vec<EnvRowDisplay> = form
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| EnvRowDisplay {
            index,
            enabled: if row.enabled { "✓" } else { " " },
            key: row.key.clone(),
            value: row.value.clone(),
        })
        .collect();
    println!("{}", crate::output::table::format_table(&rows));
}

fn select_row(form: &Step2Form, prompt: &str) -> Result<Option<usize>> {
    if form.rows().is_empty() {
        println!("{}", "No environment variables defined.".dimmed());
        return Ok(None);
    }
    let labels: Vec<String> = form
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| format!("{} {}={}", i, row.key, row.value))
        .collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Some(idx))
}

fn prompt_step2(form: &mut Step2Form) -> Result<Step2Action> {
    println!("\n{}", "Port Configuration".bold());
    form.port = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Port")
        .with_initial_text(form.port.clone())
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            input
                .trim()
                .parse::<u16>()
                .map(|_| ())
                .map_err(|_| "Enter a valid port number")
        })
        .interact_text()?;

    println!("\n{}", "Configure Environment Variables".bold());
    loop {
        print_env_rows(form);
        let action = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Environment variables")
            .items(&[
                "Add variable",
                "Edit variable",
                "Toggle variable",
                "Remove variable",
                "Done",
            ])
            .default(4)
            .interact()?;

        match action {
            0 => {
                form.add_row();
                let index = form.rows().len() - 1;
                let key: String = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt("Key")
                    .allow_empty(true)
                    .interact_text()?;
                let value: String = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt("Value")
                    .allow_empty(true)
                    .interact_text()?;
                form.set_key(index, key);
                form.set_value(index, value);
            }
            1 => {
                if let Some(index) = select_row(form, "Edit which variable?")? {
                    let row = &form.rows()[index];
                    let key: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt("Key")
                        .with_initial_text(row.key.clone())
                        .allow_empty(true)
                        .interact_text()?;
                    let value: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt("Value")
                        .with_initial_text(row.value.clone())
                        .allow_empty(true)
                        .interact_text()?;
                    form.set_key(index, key);
                    form.set_value(index, value);
                }
            }
            2 => {
                if let Some(index) = select_row(form, "Toggle which variable?")? {
                    form.toggle_row(index);
                }
            }
            3 => {
                if let Some(index) = select_row(form, "Remove which variable?")? {
                    form.remove_row(index);
                }
            }
            _ => break,
        }
    }

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Finish my setup")
        .items(&["Deploy now", "Back to step 1", "Cancel"])
        .default(0)
        .interact()?;

    Ok(match choice {
        0 => Step2Action::Deploy,
        1 => Step2Action::Back,
        _ => Step2Action::Cancel,
    })
}
