//! Command-line interface for safeguard.
//!
//! This module provides the CLI structure for the `safeguard` binary: the
//! owner's profile commands, the anonymous public view and configuration.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, OwnerArgs, PrivacyFlags, ProfileCommand, ViewCommand};

use crate::logging::Verbosity;

/// safeguard - Emergency medical profiles for first responders
///
/// Owners keep an emergency profile; anyone holding its public link sees
/// the fields the owner chose to expose.
#[derive(Debug, Parser)]
#[command(name = "safeguard")]
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
    /// Manage your own emergency profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Open a public profile page, as an anonymous viewer
    View(ViewCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}
