//! Special commands parser for interactive chat
//!
//! Commands are prefixed with `/` and are case-insensitive; their arguments
//! keep the case they were typed in. `exit` and `quit` also work without
//! the slash.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Commands handled by the chat loop instead of being sent to the assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Show available commands
    Help,
    /// List saved sessions
    History,
    /// Reprint the current transcript
    Transcript,
    /// Start a new session
    NewSession,
    /// Rename the current session
    Rename(String),
    /// Focus on a condition, or clear the focus with `None`
    Condition(Option<String>),
    /// Show suggested follow-up questions
    Suggest,
    /// Ask for quick remedies for the current condition
    Remedies,
    /// Leave the chat
    Exit,
    /// Regular question for the assistant
    None,
}

/// Parse a line typed in the chat loop
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognized `/` command
/// and `CommandError::MissingArgument` when `/rename` has no title.
///
/// # Examples
///
/// ```
/// use vaidya::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/HELP").unwrap(), SpecialCommand::Help);
/// assert_eq!(
///     parse_special_command("/rename Sleep Tips").unwrap(),
///     SpecialCommand::Rename("Sleep Tips".to_string())
/// );
/// assert_eq!(parse_special_command("is ghee healthy?").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match command.as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/history" => Ok(SpecialCommand::History),
        "/show" | "/transcript" => Ok(SpecialCommand::Transcript),
        "/new" => Ok(SpecialCommand::NewSession),
        "/suggest" => Ok(SpecialCommand::Suggest),
        "/remedies" => Ok(SpecialCommand::Remedies),
        "/rename" if argument.is_empty() => Err(CommandError::MissingArgument {
            command: "/rename".to_string(),
            usage: "/rename <title>".to_string(),
        }),
        "/rename" => Ok(SpecialCommand::Rename(argument.to_string())),
        "/condition" if argument.is_empty() || argument.eq_ignore_ascii_case("off") => {
            Ok(SpecialCommand::Condition(None))
        }
        "/condition" => Ok(SpecialCommand::Condition(Some(argument.to_string()))),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

  /history          - List saved sessions
  /show             - Reprint this session's transcript
  /new              - Start a new session
  /rename <title>   - Rename this session
  /condition <name> - Focus answers on a health condition
  /condition off    - Clear the condition focus
  /suggest          - Show suggested follow-up questions
  /remedies         - Quick remedies for the current condition
  /help             - Show this help
  /exit, exit       - Leave the chat

Anything else is sent to the assistant as a question.
"#
    );
}
