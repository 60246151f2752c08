//! Platform trait definitions
//!
//! Defines the CommunityPlatform trait that the role lifecycle drives. Every
//! call is asynchronous and may fail with a [`PlatformError`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PlatformResult;

use super::{CapabilitySet, CommunityId, Member, Role};

/// Operations the role lifecycle needs from a chat platform.
///
/// The trait is object-safe so pipelines can hold a [`SharedPlatform`].
#[async_trait]
pub trait CommunityPlatform: Send + Sync {
    /// Platform name for logs (e.g., "discord", "mock")
    fn name(&self) -> &'static str;

    // ─────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────

    /// All roles of the community, in platform order
    async fn list_roles(&self, community: CommunityId) -> PlatformResult<Vec<Role>>;

    /// Create a role with the given name and permissions
    async fn create_role(
        &self,
        community: CommunityId,
        name: &str,
        permissions: CapabilitySet,
        reason: &str,
    ) -> PlatformResult<Role>;

    /// Delete a role
    async fn delete_role(
        &self,
        community: CommunityId,
        role: &Role,
        reason: &str,
    ) -> PlatformResult<()>;

    // ─────────────────────────────────────────────────────────────
    // Members
    // ─────────────────────────────────────────────────────────────

    /// All current members of the community
    async fn list_members(&self, community: CommunityId) -> PlatformResult<Vec<Member>>;

    /// Give a role to a member
    async fn assign_role(
        &self,
        community: CommunityId,
        member: &Member,
        role: &Role,
        reason: &str,
    ) -> PlatformResult<()>;

    // ─────────────────────────────────────────────────────────────
    // Default permissions
    // ─────────────────────────────────────────────────────────────

    /// Permissions applied to members holding no role (`@everyone`)
    async fn default_permissions(&self, community: CommunityId) -> PlatformResult<CapabilitySet>;

    /// Replace the `@everyone` permissions
    async fn set_default_permissions(
        &self,
        community: CommunityId,
        permissions: CapabilitySet,
        reason: &str,
    ) -> PlatformResult<()>;
}

/// Type alias for a shared platform reference
pub type SharedPlatform = Arc<dyn CommunityPlatform>;
