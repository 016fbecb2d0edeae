//! Logout command implementation

use colored::Colorize;
use log::debug;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Clear the stored session and the query cache
pub fn logout(opts: &GlobalOptions) -> Result<()> {
    let mut config = Config::load_at(opts.config_ref())?;
    if config.validate_session().is_err() {
        println!("{}", "Already signed out.".dimmed());
        return Ok(());
    }
    config.apply_overrides(opts.api_host_ref());

    let mut ctx = CommandContext::with_config(config, opts)?;
    ctx.logout(opts.config_ref())?;
    debug!("Session cleared, cache stats now {:?}", ctx.cache.stats());

    println!("{} Signed out", "✓".green());
    Ok(())
}
