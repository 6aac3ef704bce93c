//! Command-line interface for bloodbank.
//!
//! This module provides the CLI structure for the `bbank` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    AvailabilityArg, BloodGroupArg, ConfigCommand, DonorsCommand, GenderArg, ListDonorsArgs,
    MessagesCommand, OutputFormat, RegisterArgs, SendMessageArgs, StatsCommand, UpdateArgs,
};

/// bbank - a local blood donor directory
///
/// Register, search and edit donors, and keep a log of contact messages.
#[derive(Debug, Parser)]
#[command(name = "bbank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show donor counts
    Stats(StatsCommand),

    /// Search, register and edit donors
    #[command(subcommand)]
    Donors(DonorsCommand),

    /// Send and manage contact messages
    #[command(subcommand)]
    Messages(MessagesCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
