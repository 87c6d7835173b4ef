//! Command-line interface.

mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// SoundSwap - trend scouting and blog drafting for music producers
#[derive(Parser)]
#[command(name = "soundswap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interaction server and background scheduler
    #[command(alias = "daemon")]
    Serve,

    /// Gather today's topics and post the report to the channel
    Scout {
        /// Print the report instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the rotation queries for a date
    Topics {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Build a trend report for a query and print it as JSON
    #[command(alias = "r")]
    Report {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Replace the bot's global commands
    Register,

    /// Create default config file
    Init,
}

pub use commands::*;
