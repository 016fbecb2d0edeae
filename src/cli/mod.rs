//! CLI command definitions and handlers

use clap::{CommandFactory, Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod chat;
pub mod context;
pub mod dashboard;
pub mod doc;
pub mod init;
pub mod session;
pub mod status;
pub mod task;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

use crate::client::models::TaskStatus;
use crate::error::Result;

/// Taskdock CLI - terminal companion for the task and chat dashboard
#[derive(Parser, Debug)]
#[command(name = "taskdock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "TASKDOCK_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "TASKDOCK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Dashboard API host (e.g. https://dashboard.example.com)
    #[arg(long, global = true, env = crate::config::API_HOST_ENV, hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "TASKDOCK_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store the API host and session for this machine
    Init,

    /// Show configuration and session status
    Status,

    /// Forget the stored session
    Logout,

    /// Display version information
    Version,

    /// Task counts and recent activity
    Dashboard,

    /// View tasks and work through checklists
    #[command(subcommand)]
    Task(TaskCommands),

    /// One-to-one messages
    #[command(subcommand)]
    Chat(ChatCommands),

    /// Shared documents
    #[command(subcommand)]
    Doc(DocCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   taskdock completion bash > /etc/bash_completion.d/taskdock
  zsh:    taskdock completion zsh > \"${fpath[1]}/_taskdock\"
  fish:   taskdock completion fish > ~/.config/fish/completions/taskdock.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks by status tab
    List {
        /// Status tab (pending, in-progress, completed); all when omitted
        #[arg(long, short = 's')]
        status: Option<TaskStatus>,

        /// Filter by text in title or description
        #[arg(long, short = 'q')]
        search: Option<String>,
    },

    /// Show a task with its checklist and files
    Get {
        /// Task ID
        task_id: String,
    },

    /// Mark a checklist item done (or not done with --undo)
    Check {
        /// Task ID
        task_id: String,

        /// Zero-based checklist position
        index: usize,

        /// Mark the item as not done
        #[arg(long)]
        undo: bool,
    },

    /// Upload files as a task submission
    Submit {
        /// Task ID
        task_id: String,

        /// Files to upload
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },

    /// Download the task report spreadsheet
    Export {
        /// Output path (defaults to the server-suggested file name)
        #[arg(long, short = 'o')]
        output: Option<std::path::PathBuf>,
    },
}

/// Chat subcommands
#[derive(Subcommand, Debug)]
pub enum ChatCommands {
    /// List people you can message
    Users {
        /// Filter by name or email
        #[arg(long, short = 'q')]
        search: Option<String>,
    },

    /// Show the conversation with a user
    History {
        /// Counterpart user ID
        user_id: String,
    },

    /// Send a message (prompts when no text is given)
    Send {
        /// Counterpart user ID
        user_id: String,

        /// Message text
        message: Option<String>,
    },

    /// Follow a conversation live; typed lines are sent, empty lines refresh
    Watch {
        /// Counterpart user ID
        user_id: String,
    },
}

/// Document subcommands
#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// List documents, most recently updated first
    List,

    /// Create a document
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        content: String,
    },

    /// Replace a document's content from stdin, saving as you type
    Edit {
        /// Document ID
        document_id: String,

        /// New title (keeps the current one when omitted)
        #[arg(long)]
        title: Option<String>,
    },
}

/// Write static completions for `shell` to stdout
pub fn completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_task_list_with_status() {
        let cli =
            Cli::try_parse_from(["taskdock", "task", "list", "--status", "in-progress"]).unwrap();
        match cli.command {
            Commands::Task(TaskCommands::List { status, search }) => {
                assert_eq!(status, Some(TaskStatus::InProgress));
                assert!(search.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "taskdock", "chat", "send", "u1", "hello", "--format", "json", "--debug",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.debug);
    }

    #[test]
    fn test_submit_requires_files() {
        assert!(Cli::try_parse_from(["taskdock", "task", "submit", "T1"]).is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(Cli::try_parse_from(["taskdock", "task", "list", "--status", "later"]).is_err());
    }
}
