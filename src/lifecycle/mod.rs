//! Verified-role lifecycle
//!
//! Three pipelines share one [`RoleLifecycle`]:
//!
//! - install: fetch roles → delete old role → create role → humanize → lock down `@everyone`
//! - humanize: fetch members → resolve role → verify and assign
//! - uninstall: fetch roles → delete role (if any) → restore `@everyone`
//!
//! Steps run strictly in order and the first failure ends the pipeline.
//! Nothing already committed is rolled back; re-running a pipeline is safe
//! because install replaces the role and humanize skips members that hold it.
//!
//! The lifecycle does not serialize itself. Callers running several commands
//! against one guild must hold a [`crate::dispatch::CommunityLocks`] guard.

mod humanize;
mod install;
mod outcome;
mod permissions;
mod uninstall;

pub use outcome::{HumanizeOutcome, InstallOutcome, UninstallOutcome};
pub use permissions::{PermissionChange, PermissionGuard, GUARDED_CAPABILITIES};

use crate::platform::{CapabilitySet, SharedPlatform};
use crate::verify::SharedVerifier;

/// Audit log reasons attached to platform mutations
pub(crate) mod reasons {
    pub const INSTALL: &str = "Discaptcha install command executed.";
    pub const REPLACE: &str = "Replacing the old role with a new one.";
    pub const HUMANIZE: &str = "Member passed Discaptcha verification.";
    pub const UNINSTALL: &str = "Discaptcha uninstall command executed.";
}

/// Permissions the verified role is created with
pub fn verified_role_permissions() -> CapabilitySet {
    GUARDED_CAPABILITIES
}

/// Runs install, humanize and uninstall against a community platform
pub struct RoleLifecycle {
    platform: SharedPlatform,
    verifier: SharedVerifier,
    concurrency: usize,
}

impl RoleLifecycle {
    /// Create a lifecycle that assigns roles one member at a time
    pub fn new(platform: SharedPlatform, verifier: SharedVerifier) -> Self {
        Self {
            platform,
            verifier,
            concurrency: 1,
        }
    }

    /// Allow up to `limit` role assignments in flight during humanize
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }
}
