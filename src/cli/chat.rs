//! Chat command implementations

use std::collections::HashSet;

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cache::QueryStatus;
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::models::{Message, User};
use crate::error::Result;
use crate::models::{MessageDisplay, UserDisplay};
use crate::mutation::Mutation;
use crate::output::Formattable;
use crate::output::json::format_json;
use crate::queries;
use crate::view::{ChatLine, ViewState, conversation, filter_users};

/// List chat users
pub async fn users(opts: &GlobalOptions, search: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let users = queries::chat_users(&ctx.client).get(&ctx.cache).await?;
    let me = ctx.config.user_id.as_deref();

    let rows: Vec<UserDisplay> = filter_users(&users, search.unwrap_or_default(), me)
        .into_iter()
        .map(UserDisplay::from)
        .collect();
    rows.print(ctx.format)
}

/// Print a conversation once
pub async fn history(opts: &GlobalOptions, user_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let users = queries::chat_users(&ctx.client);
    let messages = queries::messages(&ctx.client, user_id);
    let (users, messages) = tokio::join!(users.get(&ctx.cache), messages.get(&ctx.cache));
    let messages = messages?;
    // The name is cosmetic; fall back to the raw ID
    let name = counterpart_name(users.as_deref().unwrap_or_default(), user_id);

    let lines = conversation(&messages, ctx.user_id());
    if ctx.format == OutputFormat::Json {
        println!("{}", format_json(&lines)?);
        return Ok(());
    }
    if lines.is_empty() && ctx.format == OutputFormat::Pretty {
        println!("{}", format!("No messages with {} yet.", name).dimmed());
        return Ok(());
    }
    let rows: Vec<MessageDisplay> = lines
        .iter()
        .map(|l| MessageDisplay::from_line(l, &name))
        .collect();
    rows.print(ctx.format)
}

fn counterpart_name(users: &[User], user_id: &str) -> String {
    users
        .iter()
        .find(|u| u.id == user_id)
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| user_id.to_string())
}

/// Send one message, prompting when no text was given
pub async fn send(opts: &GlobalOptions, user_id: &str, message: Option<String>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let body = match message {
        Some(body) => body,
        None => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Message to {}", user_id))
            .interact_text()?,
    };

    ctx.coordinator
        .mutate(Mutation::SendMessage {
            to: user_id.to_string(),
            body,
        })
        .await?;
    Ok(())
}

/// Follow a conversation until stdin closes or Ctrl-C.
///
/// The conversation is polled in the background. A typed line is sent as a
/// message; an empty line counts as a focus event and refreshes right away.
pub async fn watch(opts: &GlobalOptions, user_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let poll = ctx.config.preferences.chat_poll_interval();
    let name = match queries::chat_users(&ctx.client).get(&ctx.cache).await {
        Ok(users) => counterpart_name(&users, user_id),
        Err(err) => {
            warn!("Could not load chat users: {}", err);
            user_id.to_string()
        }
    };

    let query = queries::messages(&ctx.client, user_id).with_options(|o| o.poll_every(poll));
    let mut observer = query.observe(&ctx.cache);
    let mut seen = HashSet::new();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    eprintln!(
        "{}",
        format!(
            "Chatting with {} (refresh every {}s). \
             Type to send, empty line to refresh, Ctrl-D to quit.",
            name,
            poll.as_secs()
        )
        .dimmed()
    );

    debug!("Watching {}", observer.key());
    render_new(&observer.settled().await, &mut seen, ctx.user_id(), &name);
    loop {
        tokio::select! {
            changed = observer.changed() => {
                let Some(status) = changed else { break };
                render_new(&status, &mut seen, ctx.user_id(), &name);
            }
            line = input.next_line() => {
                let Some(line) = line? else { break };
                let text = line.trim();
                if text.is_empty() {
                    if let QueryStatus::Error { .. } = observer.status() {
                        if let Err(err) = observer.retry().await {
                            debug!("Retry failed: {}", err);
                        }
                    } else {
                        let refreshed = ctx.cache.notify_focus();
                        debug!("Focus refresh of {} queries", refreshed);
                    }
                    continue;
                }
                // Failures are already reported through the notifier
                if let Err(err) = ctx
                    .coordinator
                    .mutate(Mutation::SendMessage {
                        to: user_id.to_string(),
                        body: text.to_string(),
                    })
                    .await
                {
                    debug!("Send failed: {}", err);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

/// Print lines not shown yet; report errors without stopping
fn render_new(status: &QueryStatus, seen: &mut HashSet<String>, me: &str, name: &str) {
    let state = ViewState::for_list(status);
    if let Some(message) = &state.error {
        eprintln!("{} {}", "✗".red(), message.red());
    }
    let Some(Ok(messages)) = status
        .data()
        .map(|v| serde_json::from_value::<Vec<Message>>(v.clone()))
    else {
        return;
    };
    for line in conversation(&messages, me) {
        if seen.insert(line.id.clone()) {
            print_line(&line, name);
        }
    }
}

fn print_line(line: &ChatLine, name: &str) {
    let row = MessageDisplay::from_line(line, name);
    let from = match line.side {
        crate::view::Side::Mine => row.from.green(),
        crate::view::Side::Theirs => row.from.cyan(),
    };
    println!("{} {}: {}", row.time.dimmed(), from.bold(), row.body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::fixtures::{message, user};

    #[test]
    fn test_counterpart_name_lookup() {
        let users = vec![user("u1", "Alice")];
        assert_eq!(counterpart_name(&users, "u1"), "Alice");
        assert_eq!(counterpart_name(&users, "u9"), "u9");
    }

    #[test]
    fn test_render_marks_lines_seen_once() {
        let data = serde_json::to_value(vec![
            message("m1", "u1", "me", "hi", 1),
            message("m2", "me", "u1", "hey", 2),
        ])
        .unwrap();
        let mut seen = HashSet::new();

        render_new(&QueryStatus::Ready(data.clone()), &mut seen, "me", "Alice");
        assert_eq!(seen.len(), 2);
        render_new(&QueryStatus::Refetching(data), &mut seen, "me", "Alice");
        assert_eq!(seen.len(), 2);
    }
}
