//! Discaptcha - verified role lifecycle for Discord guilds
//!
//! This is the main entry point for the discaptcha binary. Each lifecycle
//! command runs one pipeline against one guild and prints its reply.

mod cli;
mod config;
mod dispatch;
mod error;
mod lifecycle;
mod logging;
mod platform;
mod verify;
mod version;

use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};

use crate::cli::{Cli, Commands, ConfigSubcommand, TargetArgs};
use crate::config::{BotConfig, LoggingSettings};
use crate::dispatch::{AdminCommand, CommandReply, Dispatcher};
use crate::error::{Error, Result};
use crate::lifecycle::RoleLifecycle;
use crate::platform::{DiscordClient, SharedPlatform};

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    }
}

/// Run the parsed command, returning the process exit code
fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Version => {
            version::print_version();
            Ok(0)
        }
        Commands::Config { subcommand } => {
            let quiet_logging = LoggingSettings {
                level: "warn".to_string(),
                ..Default::default()
            };
            let _log_guards = logging::init_logging(&quiet_logging, cli.verbose, cli.quiet)?;
            handle_config_command(subcommand.clone())?;
            Ok(0)
        }
        Commands::Install(target) => run_lifecycle(AdminCommand::Install, target, cli.verbose, cli.quiet),
        Commands::Humanize(target) => run_lifecycle(AdminCommand::Humanize, target, cli.verbose, cli.quiet),
        Commands::Uninstall(target) => {
            run_lifecycle(AdminCommand::Uninstall, target, cli.verbose, cli.quiet)
        }
        Commands::Run { command, target } => match AdminCommand::parse(command) {
            Some(command) => run_lifecycle(command, target, cli.verbose, cli.quiet),
            None => {
                let reply = CommandReply::help();
                eprintln!("{}", reply.message);
                Ok(reply.exit_code)
            }
        },
    }
}

/// Load configuration and apply the per-command CLI overrides
fn load_config(target: &TargetArgs) -> Result<BotConfig> {
    let mut config = BotConfig::load(target.config.as_deref())?;

    if let Some(ref name) = target.role_name {
        config.roles.verified_role_name = name.clone();
    }
    if let Some(ref verifier) = target.verifier {
        config.humanize.verifier = verifier.clone();
    }
    if let Some(concurrency) = target.concurrency {
        config.humanize.concurrency = concurrency;
    }

    config.validate()?;
    Ok(config)
}

/// Run one lifecycle pipeline on a single-threaded runtime
fn run_lifecycle(command: AdminCommand, target: &TargetArgs, verbose: u8, quiet: bool) -> Result<i32> {
    let config = load_config(target)?;

    // The guards must be kept alive until the pipeline has finished
    let _log_guards = logging::init_logging(&config.logging, verbose, quiet)?;

    let build = version::build_info();
    debug!(version = %build.full_version(), "Starting Discaptcha");

    config.require_token()?;
    let verifier = config.humanize.verifier_kind()?.build(config.humanize.min_account_age_days);
    let client = DiscordClient::new(&config.discord, config.humanize.member_page_size)?;
    let platform: SharedPlatform = Arc::new(client);

    let lifecycle =
        RoleLifecycle::new(platform, verifier).with_concurrency(config.humanize.concurrency);
    let dispatcher = Dispatcher::new(lifecycle, config.roles.verified_role_name.clone());

    info!(
        command = %command,
        guild = %target.guild,
        role = %dispatcher.role_name(),
        verifier = %config.humanize.verifier,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    println!("{}", command.progress_notice());
    let reply = runtime.block_on(dispatcher.execute(command, target.guild));

    if reply.success {
        println!("{}", reply.message);
    } else {
        eprintln!("{}", reply.message);
    }
    Ok(reply.exit_code)
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = BotConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg.redacted())?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            BotConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
