//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::{DashboardClient, TaskApi};
use crate::config::Config;
use crate::error::Result;

/// Prompt for host, session and user ID, verify them, and save.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to Taskdock!".bold().green());
    println!("Let's connect to your dashboard.\n");

    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();
    let theme = ColorfulTheme::default();

    let default_host = opts
        .api_host
        .clone()
        .or_else(|| config.api_host.clone())
        .unwrap_or_default();
    let api_host: String = Input::with_theme(&theme)
        .with_prompt("Dashboard API host")
        .with_initial_text(default_host)
        .interact_text()?;

    let session: String = Password::with_theme(&theme)
        .with_prompt("Session token (value of the `token` cookie)")
        .interact()?;

    let user_id: String = Input::with_theme(&theme)
        .with_prompt("Your user ID (optional, used to mark your chat messages)")
        .with_initial_text(config.user_id.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    config.api_host = Some(api_host.trim().trim_end_matches('/').to_string());
    config.session = Some(session.trim().to_string());
    config.user_id = Some(user_id.trim().to_string()).filter(|id| !id.is_empty());

    println!("\n{}", "Checking session...".cyan());
    let client = DashboardClient::from_config(&config)?;
    let summary = client.dashboard_summary().await?;
    println!(
        "{} Connected ({} tasks visible)",
        "✓".green(),
        summary.statistics.total_tasks
    );

    config.save_at(opts.config_ref())?;
    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "taskdock status".cyan());
    println!("  {} - List your tasks", "taskdock task list".cyan());

    Ok(())
}
