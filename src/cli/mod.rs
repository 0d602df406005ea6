//! Command-line interface for LMN.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};

use crate::services::Pass;

/// LMN - Live Music Notes
/// Track the concerts you've been to and what you thought of them
#[derive(Parser)]
#[command(name = "lmn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web API server
    #[command(alias = "web")]
    Serve,

    /// Run one ingestion pass against Ticketmaster
    Ingest {
        #[arg(value_enum)]
        pass: IngestPass,
    },

    /// Manage users and their API keys
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IngestPass {
    Artists,
    Venues,
    Shows,
}

impl From<IngestPass> for Pass {
    fn from(pass: IngestPass) -> Self {
        match pass {
            IngestPass::Artists => Self::Artists,
            IngestPass::Venues => Self::Venues,
            IngestPass::Shows => Self::Shows,
        }
    }
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user and print their API key
    Add {
        username: String,
        /// Allow this user to trigger ingestion
        #[arg(long)]
        admin: bool,
    },
    /// List users
    #[command(alias = "ls")]
    List,
    /// Replace a user's API key
    RegenerateKey { username: String },
}

pub use commands::*;
