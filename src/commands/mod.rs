/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`    Interactive chat with resumable sessions
- `ask`     One question, one printed reply
- `history` Listing, showing, renaming and deleting sessions
- `create_session` and `suggest` for the small one-shot commands
*/

use crate::assistant::Assistant;
use crate::config::Config;
use crate::prompts::{suggested_questions, Condition};
use crate::providers::create_provider;
use crate::session::{ChatHistory, DisplayMessage, Role};
use crate::storage::open_store;
use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

pub mod history;
pub mod special_commands;

/// Open the configured store and wrap it in a chat history
pub fn open_history(config: &Config) -> Result<Arc<ChatHistory>> {
    let store = open_store(&config.storage)?;
    tracing::debug!(backend = store.backend(), "Opened history store");
    Ok(Arc::new(
        ChatHistory::new(store).with_default_title(config.chat.default_title.clone()),
    ))
}

/// Build an assistant from configuration
///
/// `provider_override` replaces the configured provider type.
pub fn build_assistant(config: &Config, provider_override: Option<&str>) -> Result<Assistant> {
    let provider_type = provider_override.unwrap_or(&config.provider.provider_type);
    let provider = create_provider(provider_type, &config.provider)?;
    Ok(Assistant::new(
        open_history(config)?,
        Arc::from(provider),
        config.chat.clone(),
    ))
}

/// Print a transcript with colored speaker labels
pub fn print_transcript(messages: &[DisplayMessage]) {
    for message in messages {
        let stamp = message.timestamp.format("%Y-%m-%d %H:%M");
        let label = match message.role {
            Role::User => "You".green().bold(),
            Role::Assistant => "Vaidya".cyan().bold(),
        };
        println!("{} {}\n{}\n", label, stamp.to_string().dimmed(), message.text);
    }
}

/// Print an error notice the way the chat surfaces show it
fn print_error(error: &crate::error::VaidyaError) {
    eprintln!("{}", error.user_message().red());
    if error.is_retryable() {
        eprintln!("{}", "You can try again.".dimmed());
    }
}

/// Create an empty session and print its id
pub async fn create_session(config: &Config, title: Option<String>) -> Result<()> {
    let history = open_history(config)?;
    let session = history
        .create_session(&config.identity.owner_id, title.as_deref())
        .await?;
    println!("{} {}", "Created session".green(), session.id.cyan());
    Ok(())
}

/// Print suggested follow-up questions
pub fn suggest(condition: Option<String>) -> Result<()> {
    let condition = condition.map(Condition::named);
    for (i, question) in suggested_questions(condition.as_ref()).iter().enumerate() {
        println!("{}. {}", i + 1, question);
    }
    Ok(())
}

// One-shot question handler
pub mod ask {
    //! Ask a single question and print the reply.

    use super::*;

    /// Answer one question, continuing `session` or starting a new session
    pub async fn run_ask(
        config: Config,
        prompt: String,
        session: Option<String>,
        provider: Option<String>,
        condition: Option<String>,
    ) -> Result<()> {
        let assistant = build_assistant(&config, provider.as_deref())?;
        let owner = &config.identity.owner_id;

        let session_id = match session {
            Some(id) => assistant.history().resolve_session_id(owner, &id).await?,
            None => assistant.start_session(owner).await?.id,
        };

        let condition = condition.map(Condition::named);
        match assistant
            .ask(owner, &session_id, &prompt, condition.as_ref())
            .await
        {
            Ok(turn) => {
                println!("{}\n", turn.reply);
                println!(
                    "{} {} ({} messages)",
                    "Session".dimmed(),
                    turn.session.id.cyan(),
                    turn.session.message_count
                );
                Ok(())
            }
            Err(e) => {
                print_error(&e);
                Err(e.into())
            }
        }
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Runs a readline loop: slash commands are handled locally and every
    //! other line is asked within the current session.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::storage::Session;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `resume` - Session id or prefix to continue
    /// * `provider_name` - Optional override for the configured provider
    /// * `condition` - Optional condition to focus answers on
    pub async fn run_chat(
        config: Config,
        resume: Option<String>,
        provider_name: Option<String>,
        condition: Option<String>,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let assistant = build_assistant(&config, provider_name.as_deref())?;
        let owner = config.identity.owner_id.clone();
        let mut condition = condition.map(Condition::named);

        let mut session = match resume {
            Some(id) => {
                let id = assistant.history().resolve_session_id(&owner, &id).await?;
                assistant.history().get_session(&owner, &id).await?
            }
            None => assistant.start_session(&owner).await?,
        };

        print_welcome_banner(&session, assistant.provider_name());
        print_transcript(
            &assistant
                .history()
                .build_transcript(&owner, &session.id)
                .await?,
        );

        let mut rl = DefaultEditor::new()?;

        loop {
            let prompt = format!("{} ", "›".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().yellow());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::History => {
                            super::history::print_sessions(assistant.history(), &owner).await?
                        }
                        SpecialCommand::Transcript => print_transcript(
                            &assistant
                                .history()
                                .build_transcript(&owner, &session.id)
                                .await?,
                        ),
                        SpecialCommand::NewSession => {
                            session = assistant.start_session(&owner).await?;
                            print_welcome_banner(&session, assistant.provider_name());
                        }
                        SpecialCommand::Rename(title) => {
                            match assistant
                                .history()
                                .rename_session(&owner, &session.id, &title)
                                .await
                            {
                                Ok(renamed) => {
                                    println!("Renamed to {}\n", renamed.title.cyan());
                                    session = renamed;
                                }
                                Err(e) => print_error(&e),
                            }
                        }
                        SpecialCommand::Condition(title) => {
                            condition = title.map(Condition::named);
                            match &condition {
                                Some(c) => println!("Focusing on {}\n", c.title.cyan()),
                                None => println!("Condition focus cleared\n"),
                            }
                        }
                        SpecialCommand::Suggest => {
                            for question in suggested_questions(condition.as_ref()) {
                                println!("  • {}", question);
                            }
                            println!();
                        }
                        SpecialCommand::Remedies => match &condition {
                            Some(c) => match assistant.quick_remedies(c).await {
                                Ok(text) => println!("\n{}\n", text),
                                Err(e) => print_error(&e),
                            },
                            None => println!(
                                "{}\n",
                                "Set a condition first with /condition <name>".yellow()
                            ),
                        },
                        SpecialCommand::None => {
                            match assistant
                                .ask(&owner, &session.id, trimmed, condition.as_ref())
                                .await
                            {
                                Ok(turn) => {
                                    println!("\n{}\n", turn.reply);
                                    session = turn.session;
                                }
                                Err(e) => print_error(&e),
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!(
            "Goodbye! Resume with {}",
            format!("vaidya chat --resume {}", session.id).cyan()
        );
        Ok(())
    }

    fn print_welcome_banner(session: &Session, provider: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║            Vaidya Ayurvedic Wellness Assistant               ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Session:  {} ({})", session.id.cyan(), session.title);
        println!("Provider: {}\n", provider);
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }
}
