//! Dashboard command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::{StatDisplay, TaskDisplay};
use crate::output::{Formattable, json::format_json};
use crate::queries;

pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let summary = queries::dashboard(&ctx.client).get(&ctx.cache).await?;

    if ctx.format == OutputFormat::Json {
        println!("{}", format_json(&summary)?);
        return Ok(());
    }

    let stats = &summary.statistics;
    let rows = vec![
        StatDisplay::new("Total", stats.total_tasks),
        StatDisplay::new("Pending", stats.pending_tasks),
        StatDisplay::new("In Progress", stats.in_progress_tasks),
        StatDisplay::new("Completed", stats.completed_tasks),
        StatDisplay::new("Overdue", stats.overdue_tasks),
    ];
    rows.print(ctx.format)?;

    if ctx.format == OutputFormat::Pretty {
        println!("\n{}", "Recent tasks".bold());
    }
    let recent: Vec<TaskDisplay> = summary.recent_tasks.iter().map(TaskDisplay::from).collect();
    recent.print(ctx.format)?;
    Ok(())
}
