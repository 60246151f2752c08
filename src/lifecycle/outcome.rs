//! Successful pipeline results
//!
//! Each outcome renders, via `Display`, the reply sent back to whoever issued
//! the command.

use std::fmt;

use crate::platform::{CapabilitySet, Role};

/// Result of a successful humanize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanizeOutcome {
    /// Members given the role by this run
    pub assigned: usize,
    /// Members that already held the role
    pub already_verified: usize,
    /// Members the verifier rejected
    pub rejected: usize,
}

impl fmt::Display for HumanizeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "humanization done. {} new member(s) were given the verified role.",
            self.assigned
        )
    }
}

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// The freshly created verified role
    pub role: Role,
    /// Whether an older role with the same name was deleted first
    pub replaced_existing: bool,
    pub humanized: HumanizeOutcome,
    /// `@everyone` permissions after lockdown
    pub default_permissions: CapabilitySet,
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("installation done. Discaptcha is ready to serve this guild.")
    }
}

/// Result of a successful uninstall
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// The verified role was deleted and `@everyone` restored
    Removed {
        role: Role,
        default_permissions: CapabilitySet,
    },
    /// No role carried the reserved name; only `@everyone` was restored
    NoSuchRole { default_permissions: CapabilitySet },
}

impl UninstallOutcome {
    #[cfg(test)]
    pub fn default_permissions(&self) -> CapabilitySet {
        match self {
            UninstallOutcome::Removed { default_permissions, .. }
            | UninstallOutcome::NoSuchRole { default_permissions } => *default_permissions,
        }
    }
}

impl fmt::Display for UninstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UninstallOutcome::Removed { .. } => {
                f.write_str("uninstall done. Discaptcha has been removed from this guild.")
            }
            UninstallOutcome::NoSuchRole { .. } => {
                f.write_str("no such role to remove. @everyone permissions were restored.")
            }
        }
    }
}
