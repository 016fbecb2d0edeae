//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Display configuration status. Never contacts the server.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Taskdock Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;
    let mut config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "taskdock init".cyan()
            );
            println!();
            return Ok(());
        }
    };
    config.apply_overrides(opts.api_host_ref());

    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();

    match config.require_api_host() {
        Ok(host) => println!("{} API host: {}", "✓".green(), host),
        Err(_) => {
            println!("{} API host not configured", "✗".red());
            println!("  → Run 'taskdock init' or pass --api-host");
        }
    }

    if config.validate_session().is_ok() {
        println!("{} Session stored", "✓".green());
    } else {
        println!("{} Not signed in", "✗".red());
        println!("  → Run 'taskdock init' to store a session");
    }

    match config.user_id.as_deref() {
        Some(id) => println!("{} User ID: {}", "✓".green(), id),
        None => println!(
            "{} No user ID set (chat cannot tell your messages apart)",
            "○".dimmed()
        ),
    }

    let prefs = &config.preferences;
    println!();
    println!(
        "Preferences: format={}, chat poll={}s, autosave delay={}ms",
        prefs.format.as_deref().unwrap_or("pretty"),
        prefs.chat_poll_secs,
        prefs.autosave_delay_ms
    );
    println!();

    Ok(())
}
