//! Command-line interface definition for Vaidya
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chatting, one-shot questions and managing
//! saved conversations.

use clap::{Parser, Subcommand};

/// Vaidya - Ayurvedic wellness chat assistant
///
/// Ask questions about natural remedies and keep every conversation as a
/// resumable chat session.
#[derive(Parser, Debug, Clone)]
#[command(name = "vaidya")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the SQLite history database (overrides config)
    #[arg(long, global = true)]
    pub storage_path: Option<String>,

    /// Owner whose sessions are read and written (overrides config)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Vaidya
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Resume an existing session by id or id prefix
        #[arg(short, long)]
        resume: Option<String>,

        /// Override the provider from config (gemini, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Health condition to focus the conversation on
        #[arg(long)]
        condition: Option<String>,
    },

    /// Ask a single question and print the reply
    Ask {
        /// The question to ask
        prompt: String,

        /// Continue this session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,

        /// Override the provider from config (gemini, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Health condition to focus the answer on
        #[arg(long)]
        condition: Option<String>,
    },

    /// Manage saved conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Create an empty session and print its id
    New {
        /// Title for the new session
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Print suggested follow-up questions
    Suggest {
        /// Health condition to tailor the suggestions to
        #[arg(long)]
        condition: Option<String>,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List sessions, most recently active first
    List,

    /// Show the transcript of a session
    Show {
        /// Session id or id prefix
        id: String,
    },

    /// Rename a session
    Rename {
        /// Session id or id prefix
        id: String,

        /// New title
        title: String,
    },

    /// Delete a session and its messages
    Delete {
        /// Session id or id prefix
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            user: None,
            command: Commands::History {
                command: HistoryCommand::List,
            },
        }
    }
}
