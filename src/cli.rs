//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for Discaptcha.

use clap::{Args, Parser, Subcommand};

use crate::platform::CommunityId;

/// Discaptcha - verified role lifecycle for Discord guilds
///
/// Installs a verified role, grants it to existing members who pass
/// verification and withholds send/speak permissions from everyone else.
#[derive(Parser, Debug)]
#[command(name = "discaptcha")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors (notices and replies are still printed)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Guild and overrides shared by the lifecycle commands
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Guild (server) id to operate on
    #[arg(short, long)]
    pub guild: CommunityId,

    /// Path to configuration file
    #[arg(short, long, env = "DISCAPTCHA_CONFIG")]
    pub config: Option<String>,

    /// Override the verified role name
    #[arg(long)]
    pub role_name: Option<String>,

    /// Override the member verifier (non-bot, account-age, everyone)
    #[arg(long)]
    pub verifier: Option<String>,

    /// Override how many role assignments may run at once
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the verified role, humanize members and lock down @everyone
    Install(TargetArgs),

    /// Give the verified role to every member that passes verification
    Humanize(TargetArgs),

    /// Delete the verified role and restore @everyone permissions
    Uninstall(TargetArgs),

    /// Run a lifecycle command given by name, as typed in a guild channel
    Run {
        /// Command word: install, humanize or uninstall
        command: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration (token redacted)
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
