use super::{open_history, print_transcript};
use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::session::ChatHistory;
use anyhow::Result;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub async fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let history = open_history(config)?;
    let owner = &config.identity.owner_id;

    match command {
        HistoryCommand::List => {
            print_sessions(&history, owner).await?;
            println!(
                "Use {} to resume a session.",
                "vaidya chat --resume <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => {
            let id = history.resolve_session_id(owner, &id).await?;
            let session = history.get_session(owner, &id).await?;
            println!("\n{} {}\n", session.title.bold(), session.id.dimmed());
            print_transcript(&history.build_transcript(owner, &id).await?);
        }
        HistoryCommand::Rename { id, title } => {
            let id = history.resolve_session_id(owner, &id).await?;
            let session = history.rename_session(owner, &id, &title).await?;
            println!(
                "{}",
                format!("Renamed {} to \"{}\"", session.id, session.title).green()
            );
        }
        HistoryCommand::Delete { id } => {
            let id = history.resolve_session_id(owner, &id).await?;
            let removed = history.delete_session(owner, &id).await?;
            println!(
                "{}",
                format!("Deleted conversation {} ({} messages)", id, removed).green()
            );
        }
    }

    Ok(())
}

/// Print the session table for an owner, most recent first
pub async fn print_sessions(history: &ChatHistory, owner_id: &str) -> Result<()> {
    let sessions = history.history(owner_id).await?;

    if sessions.is_empty() {
        println!("{}", "No conversation history found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for session in sessions {
        let updated = session
            .updated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        let count = if session.is_unused() {
            "-".dimmed().to_string()
        } else {
            session.message_count.to_string()
        };

        table.add_row(prettytable::row![
            session.short_id().cyan(),
            session.display_title(40),
            count,
            updated
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_config;

    #[tokio::test]
    async fn test_print_sessions_handles_empty_and_filled() {
        let config = test_config();
        let history = open_history(&config).unwrap();
        print_sessions(&history, "tester").await.unwrap();

        let session = history.create_session("tester", None).await.unwrap();
        history
            .append_pair("tester", &session.id, "Neem for acne?", "Apply a paste.")
            .await
            .unwrap();
        print_sessions(&history, "tester").await.unwrap();
    }

    #[tokio::test]
    async fn test_handle_history_rejects_unknown_id() {
        let config = test_config();
        let result = handle_history(
            &config,
            HistoryCommand::Delete {
                id: "nope".to_string(),
            },
        )
        .await;
        assert!(result.is_err());
    }
}
