//! Document command implementations

use colored::Colorize;
use log::debug;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::client::models::{Document, DocumentDraft};
use crate::error::{Error, Result};
use crate::models::DocumentDisplay;
use crate::mutation::{Autosaver, Mutation, MutationOutcome};
use crate::output::Formattable;
use crate::queries;
use crate::view::sorted_documents;

/// List documents
pub async fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let documents = queries::documents(&ctx.client).get(&ctx.cache).await?;
    let rows: Vec<DocumentDisplay> = sorted_documents(&documents)
        .iter()
        .map(DocumentDisplay::from)
        .collect();
    rows.print(ctx.format)
}

/// Create a document and print it
pub async fn create(opts: &GlobalOptions, title: &str, content: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let outcome = ctx
        .coordinator
        .mutate(Mutation::CreateDocument(DocumentDraft::new(title, content)))
        .await?;
    if let MutationOutcome::Document(doc) = outcome {
        vec![DocumentDisplay::from(&doc)].print(ctx.format)?;
    }
    Ok(())
}

/// Replace a document's content from stdin, saving as typing pauses.
///
/// Every line read restarts the autosave window. Whatever is still pending
/// at end of input is saved before returning.
pub async fn edit(opts: &GlobalOptions, document_id: &str, title: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let documents = queries::documents(&ctx.client).get(&ctx.cache).await?;
    let current = find_document(&documents, document_id)?;
    let title = title.unwrap_or(current.title.as_str()).to_string();

    let delay = ctx.config.preferences.autosave_delay();
    let mut autosaver = Autosaver::new(
        std::sync::Arc::clone(&ctx.coordinator),
        document_id,
        delay,
    );
    eprintln!(
        "{}",
        format!(
            "Editing \"{}\". Content is read from stdin and saved {}ms after the last line. \
             Ctrl-D to finish.",
            title,
            delay.as_millis()
        )
        .dimmed()
    );

    let mut content = String::new();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(&line);
        autosaver.schedule(DocumentDraft::new(title.clone(), content.clone()));
    }

    if autosaver.is_pending() {
        debug!("Saving the last edit before exit");
    }
    match autosaver.flush().await? {
        Some(MutationOutcome::Document(doc)) => {
            vec![DocumentDisplay::from(&doc)].print(ctx.format)?;
        }
        Some(_) => {}
        None => debug!("No pending edit at end of input"),
    }
    Ok(())
}

fn find_document<'a>(documents: &'a [Document], id: &str) -> Result<&'a Document> {
    documents
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| Error::Other(format!("Document {} not found", id)))
}
