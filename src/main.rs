//! Taskdock CLI - terminal companion for the task and chat dashboard

use clap::Parser;
use env_logger::Env;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod mutation;
mod notify;
mod output;
mod queries;
mod view;

use cli::{ChatCommands, Cli, Commands, DocCommands, GlobalOptions, TaskCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err.user_message());
        if let Some(hint) = err.hint() {
            eprintln!("{}", hint);
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still wins over --debug
    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Logout => cli::session::logout(&opts),
        Commands::Version => {
            println!("taskdock version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Dashboard => cli::dashboard::run(&opts).await,
        Commands::Task(task_cmd) => match task_cmd {
            TaskCommands::List { status, search } => {
                cli::task::list(&opts, status, search.as_deref()).await
            }
            TaskCommands::Get { task_id } => cli::task::get(&opts, &task_id).await,
            TaskCommands::Check {
                task_id,
                index,
                undo,
            } => cli::task::check(&opts, &task_id, index, undo).await,
            TaskCommands::Submit { task_id, files } => {
                cli::task::submit(&opts, &task_id, &files).await
            }
            TaskCommands::Export { output } => cli::task::export(&opts, output.as_deref()).await,
        },
        Commands::Chat(chat_cmd) => match chat_cmd {
            ChatCommands::Users { search } => cli::chat::users(&opts, search.as_deref()).await,
            ChatCommands::History { user_id } => cli::chat::history(&opts, &user_id).await,
            ChatCommands::Send { user_id, message } => {
                cli::chat::send(&opts, &user_id, message).await
            }
            ChatCommands::Watch { user_id } => cli::chat::watch(&opts, &user_id).await,
        },
        Commands::Doc(doc_cmd) => match doc_cmd {
            DocCommands::List => cli::doc::list(&opts).await,
            DocCommands::Create { title, content } => {
                cli::doc::create(&opts, &title, &content).await
            }
            DocCommands::Edit { document_id, title } => {
                cli::doc::edit(&opts, &document_id, title.as_deref()).await
            }
        },
        Commands::Completion { shell } => cli::completion(shell),
    }
}
