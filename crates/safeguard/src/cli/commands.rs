//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::profile::PrivacySettings;

/// The acting owner.
#[derive(Debug, Clone, Args)]
pub struct OwnerArgs {
    /// User id to act as
    #[arg(short, long, value_name = "ID")]
    pub user: String,

    /// Email shown for the acting user
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,
}

/// Owner profile commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show your own profile
    Show {
        #[command(flatten)]
        owner: OwnerArgs,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Validate a draft and save it as your profile
    Save {
        #[command(flatten)]
        owner: OwnerArgs,

        /// Path to the draft (JSON, camelCase fields)
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Print your profile's share URL (also the QR payload)
    Url {
        #[command(flatten)]
        owner: OwnerArgs,
    },

    /// Change which optional fields the public page shows
    Privacy {
        #[command(flatten)]
        owner: OwnerArgs,

        #[command(flatten)]
        flags: PrivacyFlags,
    },

    /// Delete your profile
    Delete {
        #[command(flatten)]
        owner: OwnerArgs,
    },
}

impl ProfileCommand {
    /// The acting owner of any profile command.
    #[must_use]
    pub fn owner(&self) -> &OwnerArgs {
        match self {
            Self::Show { owner, .. }
            | Self::Save { owner, .. }
            | Self::Url { owner }
            | Self::Privacy { owner, .. }
            | Self::Delete { owner } => owner,
        }
    }
}

/// Privacy flags to change. Flags left out keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Args)]
pub struct PrivacyFlags {
    /// Show doctor name and contact
    #[arg(long, value_name = "BOOL")]
    pub show_doctor_info: Option<bool>,

    /// Show health insurance
    #[arg(long, value_name = "BOOL")]
    pub show_insurance: Option<bool>,

    /// Show exact location (stored, currently has no effect)
    #[arg(long, value_name = "BOOL")]
    pub show_exact_location: Option<bool>,

    /// Show disabilities
    #[arg(long, value_name = "BOOL")]
    pub show_disabilities: Option<bool>,
}

impl PrivacyFlags {
    /// Whether no flag was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the given flags to `privacy`.
    pub fn apply(&self, privacy: &mut PrivacySettings) {
        if let Some(value) = self.show_doctor_info {
            privacy.show_doctor_info = value;
        }
        if let Some(value) = self.show_insurance {
            privacy.show_insurance = value;
        }
        if let Some(value) = self.show_exact_location {
            privacy.show_exact_location = value;
        }
        if let Some(value) = self.show_disabilities {
            privacy.show_disabilities = value;
        }
    }
}

/// Public view command arguments.
#[derive(Debug, Args)]
pub struct ViewCommand {
    /// The part of the public URL after `/u/`
    pub segment: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
