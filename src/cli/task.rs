//! Task command implementations

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::TaskApi;
use crate::client::models::{Task, TaskStatus, UploadFile};
use crate::error::Result;
use crate::models::display::{format_datetime, format_size};
use crate::models::{ChecklistDisplay, FileDisplay, TaskDisplay};
use crate::mutation::{Mutation, MutationOutcome};
use crate::output::Formattable;
use crate::output::json::format_json;
use crate::output::table::format_details;
use crate::queries;
use crate::view::{StatusTab, TaskListView, task_detail_view, task_list_view};

/// List tasks for one status tab
pub async fn list(
    opts: &GlobalOptions,
    status: Option<TaskStatus>,
    search: Option<&str>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let tasks = queries::tasks(&ctx.client, status).get(&ctx.cache).await?;
    let view = task_list_view(&tasks, StatusTab::from(status), search.unwrap_or_default());
    debug!("{} of {} tasks after search", view.rows.len(), tasks.items.len());

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&view)?),
        OutputFormat::Table => {
            let rows: Vec<TaskDisplay> = view.rows.iter().map(TaskDisplay::from).collect();
            rows.print(OutputFormat::Table)?;
        }
        OutputFormat::Pretty => print_task_list(&view)?,
    }
    Ok(())
}

fn print_task_list(view: &TaskListView) -> Result<()> {
    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|t| {
            let label = format!("{} ({})", t.tab, t.count);
            if t.tab == view.active {
                label.bold().cyan().to_string()
            } else {
                label.dimmed().to_string()
            }
        })
        .collect();
    println!("{}\n", tabs.join("  |  "));

    if view.is_empty {
        println!("{}", "No tasks in this tab.".dimmed());
        return Ok(());
    }
    let rows: Vec<TaskDisplay> = view.rows.iter().map(TaskDisplay::from).collect();
    rows.print(OutputFormat::Pretty)
}

/// Show one task
pub async fn get(opts: &GlobalOptions, task_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let task = queries::task(&ctx.client, task_id).get(&ctx.cache).await?;
    print_task(&task, ctx.format)
}

fn print_task(task: &Task, format: OutputFormat) -> Result<()> {
    let view = task_detail_view(task);
    match format {
        OutputFormat::Json => println!("{}", format_json(&view)?),
        OutputFormat::Table => {
            let rows: Vec<ChecklistDisplay> =
                view.checklist.iter().map(ChecklistDisplay::from).collect();
            rows.print(OutputFormat::Table)?;
        }
        OutputFormat::Pretty => {
            let assignees: Vec<&str> = task.assigned_to.iter().map(|u| u.display_name()).collect();
            println!();
            println!(
                "{}",
                format_details(&[
                    ("Task", task.title.clone()),
                    ("ID", task.id.clone()),
                    ("Status", task.status.to_string()),
                    ("Priority", task.priority.to_string()),
                    ("Due", format_datetime(task.due_date)),
                    (
                        "Assigned",
                        if assignees.is_empty() {
                            "--".to_string()
                        } else {
                            assignees.join(", ")
                        }
                    ),
                    (
                        "Progress",
                        format!("{}/{} ({}%)", view.completed, view.total, view.progress_percent)
                    ),
                ])
            );
            if !task.description.is_empty() {
                println!("\n{}", task.description);
            }

            println!("\n{}", "Checklist".bold());
            let rows: Vec<ChecklistDisplay> =
                view.checklist.iter().map(ChecklistDisplay::from).collect();
            rows.print(OutputFormat::Pretty)?;

            let groups = [
                ("Attachments", &task.attachments),
                ("Submissions", &task.submissions),
            ];
            for (title, files) in groups {
                if files.is_empty() {
                    continue;
                }
                println!("\n{} ({})", title.bold(), files.len().to_string().cyan());
                let rows: Vec<FileDisplay> = files.iter().map(FileDisplay::from).collect();
                rows.print(OutputFormat::Pretty)?;
            }
            println!();
        }
    }
    Ok(())
}

/// Toggle a checklist item and show the confirmed task
pub async fn check(opts: &GlobalOptions, task_id: &str, index: usize, undo: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    // Loaded first so the index is validated locally
    queries::task(&ctx.client, task_id).get(&ctx.cache).await?;

    let outcome = ctx
        .coordinator
        .mutate(Mutation::ToggleChecklistItem {
            task_id: task_id.to_string(),
            index,
            completed: !undo,
        })
        .await?;

    if let MutationOutcome::Task(task) = outcome {
        print_task(&task, ctx.format)?;
    }
    Ok(())
}

/// Upload files as one multipart submission
pub async fn submit(opts: &GlobalOptions, task_id: &str, paths: &[PathBuf]) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let files = paths
        .iter()
        .map(|p| UploadFile::from_path(p))
        .collect::<std::io::Result<Vec<_>>>()?;

    let spinner = spinner(&format!("Uploading {} file(s)...", files.len()));
    let result = ctx
        .coordinator
        .mutate(Mutation::UploadSubmissions {
            task_id: task_id.to_string(),
            files,
        })
        .await;
    spinner.finish_and_clear();

    if let MutationOutcome::Task(task) = result? {
        let rows: Vec<FileDisplay> = task.submissions.iter().map(FileDisplay::from).collect();
        rows.print(ctx.format)?;
    }
    Ok(())
}

/// Download the report spreadsheet
pub async fn export(opts: &GlobalOptions, output: Option<&Path>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let spinner = spinner("Preparing report...");
    let download = ctx.client.export_tasks().await;
    spinner.finish_and_clear();
    let download = download?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&download.filename));
    std::fs::write(&path, &download.bytes)?;

    eprintln!(
        "{} Saved {} ({})",
        "✓".green(),
        path.display(),
        format_size(download.bytes.len() as u64)
    );
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

