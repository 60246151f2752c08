//! Command dispatch
//!
//! Maps operator commands onto lifecycle pipelines and serializes them per
//! guild. Callers reach this module only after they have been authorized as
//! the guild operator.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::error::LifecycleError;
use crate::lifecycle::RoleLifecycle;
use crate::platform::CommunityId;

const PROGRESS_SUFFIX: &str = "\n\nThis may take a while. I will inform you when finished.";

/// Reply to a command word that names no known command
const HELP_REPLY: &str = "available commands for you are: humanize, install, uninstall.";

// ─────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────

/// Lifecycle commands an operator can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminCommand {
    Install,
    Humanize,
    Uninstall,
}

impl AdminCommand {
    /// Parse a command word, ignoring case and surrounding whitespace
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "install" => Some(AdminCommand::Install),
            "humanize" => Some(AdminCommand::Humanize),
            "uninstall" => Some(AdminCommand::Uninstall),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdminCommand::Install => "install",
            AdminCommand::Humanize => "humanize",
            AdminCommand::Uninstall => "uninstall",
        }
    }

    /// Notice sent before the pipeline starts
    pub fn progress_notice(&self) -> String {
        let head = match self {
            AdminCommand::Install => "Installing Discaptcha... 👷",
            AdminCommand::Humanize => "Humanizing this server... 🧍",
            AdminCommand::Uninstall => "Uninstalling Discaptcha... 💣",
        };
        format!("{}{}", head, PROGRESS_SUFFIX)
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdminCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown command '{}'", s.trim()))
    }
}

// ─────────────────────────────────────────────────────────────────
// Per-guild locking
// ─────────────────────────────────────────────────────────────────

/// One async mutex per guild
///
/// Pipelines for different guilds run independently; two pipelines for the
/// same guild never overlap.
#[derive(Default)]
pub struct CommunityLocks {
    locks: Mutex<HashMap<CommunityId, Arc<AsyncMutex<()>>>>,
}

impl CommunityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `community`
    pub async fn acquire(&self, community: CommunityId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .entry(community)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Whether a pipeline currently holds the lock for `community`
    #[cfg(test)]
    pub fn is_busy(&self, community: CommunityId) -> bool {
        self.locks
            .lock()
            .get(&community)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────

/// Final reply for a dispatched command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub success: bool,
    pub message: String,
    /// Process exit code for this reply; 0 on success
    pub exit_code: i32,
}

impl CommandReply {
    fn ok(message: impl fmt::Display) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            exit_code: 0,
        }
    }

    /// Reply listing the known commands
    pub fn help() -> Self {
        Self {
            success: false,
            message: HELP_REPLY.to_string(),
            // Same code clap uses for usage errors
            exit_code: 2,
        }
    }

    fn failed(err: LifecycleError) -> Self {
        let exit_code = err.kind().code().exit_code();
        Self {
            success: false,
            message: err.to_string(),
            exit_code,
        }
    }
}

/// Runs operator commands against one lifecycle
pub struct Dispatcher {
    lifecycle: RoleLifecycle,
    role_name: String,
    locks: CommunityLocks,
}

impl Dispatcher {
    pub fn new(lifecycle: RoleLifecycle, role_name: impl Into<String>) -> Self {
        Self {
            lifecycle,
            role_name: role_name.into(),
            locks: CommunityLocks::new(),
        }
    }

    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    /// Run `command` for `community` while holding its lock
    pub async fn execute(&self, command: AdminCommand, community: CommunityId) -> CommandReply {
        let _guard = self.locks.acquire(community).await;
        info!(command = %command, guild = %community, "Dispatching command");

        let role = self.role_name.as_str();
        let result = match command {
            AdminCommand::Install => self
                .lifecycle
                .install(community, role)
                .await
                .map(CommandReply::ok),
            AdminCommand::Humanize => self
                .lifecycle
                .humanize(community, role)
                .await
                .map(CommandReply::ok)
                .map_err(LifecycleError::from),
            AdminCommand::Uninstall => self
                .lifecycle
                .uninstall(community, role)
                .await
                .map(CommandReply::ok),
        };

        result.unwrap_or_else(|err| {
            warn!(
                command = %command,
                guild = %community,
                kind = %err.kind(),
                stage = %err.stage(),
                forbidden = err.platform_error().map_or(false, |e| e.is_forbidden()),
                reply = %err,
                "Command failed"
            );
            CommandReply::failed(err)
        })
    }
}
