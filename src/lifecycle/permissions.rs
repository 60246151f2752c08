//! `@everyone` permission guard
//!
//! Adds or removes the guarded capability pair on the default permission set.
//! Every other bit of the set is left exactly as found.

use tracing::debug;

use crate::error::PlatformResult;
use crate::platform::{CapabilitySet, CommunityId, CommunityPlatform};

/// Capabilities withheld from unverified members
pub const GUARDED_CAPABILITIES: CapabilitySet =
    CapabilitySet::SEND_MESSAGES.union(CapabilitySet::SPEAK);

/// Direction of a default-permission change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionChange {
    /// Remove the guarded capabilities (install)
    Lockdown,
    /// Add the guarded capabilities back (uninstall)
    Restore,
}

/// Stateless helper that edits and commits the `@everyone` permission set
pub struct PermissionGuard<'a> {
    platform: &'a dyn CommunityPlatform,
}

impl<'a> PermissionGuard<'a> {
    pub fn new(platform: &'a dyn CommunityPlatform) -> Self {
        Self { platform }
    }

    /// New permission set after applying `change` to `current`
    pub fn apply(current: CapabilitySet, change: PermissionChange) -> CapabilitySet {
        let mut updated = current;
        match change {
            PermissionChange::Lockdown => updated.remove(GUARDED_CAPABILITIES),
            PermissionChange::Restore => updated.insert(GUARDED_CAPABILITIES),
        }
        updated
    }

    /// Read the current set, apply `change` and write it back.
    ///
    /// Returns the committed set.
    pub async fn commit(
        &self,
        community: CommunityId,
        change: PermissionChange,
        reason: &str,
    ) -> PlatformResult<CapabilitySet> {
        let current = self.platform.default_permissions(community).await?;
        let updated = Self::apply(current, change);

        debug!(
            guild = %community,
            change = ?change,
            before = %current,
            after = %updated,
            "Committing @everyone permissions"
        );

        self.platform
            .set_default_permissions(community, updated, reason)
            .await?;
        Ok(updated)
    }
}
