//! CLI module - Command-line interface for Glimpse
//!
//! This module provides a structured CLI using clap for argument parsing.

pub mod commands;

use clap::{Parser, Subcommand};

/// Glimpse - Instagram profile insights
/// Cached profile lookups with AI-generated insights, prep guides and personas
#[derive(Parser)]
#[command(name = "glimpse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C
    #[command(alias = "daemon")]
    Serve,

    /// Look up a profile, refreshing stale data and insights
    #[command(alias = "l")]
    Lookup {
        /// Instagram username, with or without a leading @
        username: String,
    },

    /// Show the cached record without touching the network
    #[command(alias = "s")]
    Show {
        username: String,
    },

    /// Regenerate AI documents regardless of freshness
    Regenerate {
        username: String,
        /// insights, strategy, personas or all
        #[arg(long, default_value = "all")]
        kind: String,
    },

    /// Send one message to a generated persona
    Chat {
        username: String,
        /// friendly, tough or irrational
        persona_id: String,
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Show a caller's recent lookups
    #[command(alias = "h")]
    History {
        /// Caller id as sent in X-Caller-Id
        caller: String,
        /// Number of entries to show
        #[arg(default_value = "10")]
        limit: u64,
    },

    /// Write a default config.toml if none exists
    Init,
}
