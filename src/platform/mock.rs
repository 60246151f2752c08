//! Mock platform for testing
//!
//! Provides an in-memory guild implementing CommunityPlatform, with
//! per-operation and per-member failure injection.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{PlatformError, PlatformResult};

use super::{CapabilitySet, CommunityId, CommunityPlatform, Member, MemberId, Role, RoleId};

// ─────────────────────────────────────────────────────────────────
// Mock Operations
// ─────────────────────────────────────────────────────────────────

/// Platform operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    ListRoles,
    CreateRole,
    DeleteRole,
    ListMembers,
    AssignRole,
    DefaultPermissions,
    SetDefaultPermissions,
}

#[derive(Debug)]
struct GuildState {
    roles: Vec<Role>,
    members: Vec<Member>,
    next_id: u64,
}

// ─────────────────────────────────────────────────────────────────
// Mock Platform
// ─────────────────────────────────────────────────────────────────

/// In-memory single-guild implementation of CommunityPlatform
pub struct MockPlatform {
    community: CommunityId,
    state: RwLock<GuildState>,
    failing_ops: RwLock<HashSet<MockOp>>,
    failing_members: RwLock<HashSet<MemberId>>,
    call_counts: RwLock<HashMap<MockOp, u32>>,
}

impl MockPlatform {
    /// Create a guild whose `@everyone` role can send messages, speak and connect
    pub fn new(community: CommunityId) -> Self {
        let everyone = Role {
            id: community.everyone_role(),
            name: "@everyone".to_string(),
            permissions: CapabilitySet::VIEW_CHANNEL
                | CapabilitySet::SEND_MESSAGES
                | CapabilitySet::READ_MESSAGE_HISTORY
                | CapabilitySet::CONNECT
                | CapabilitySet::SPEAK,
        };

        Self {
            community,
            state: RwLock::new(GuildState {
                roles: vec![everyone],
                members: Vec::new(),
                next_id: community.0 + 1,
            }),
            failing_ops: RwLock::new(HashSet::new()),
            failing_members: RwLock::new(HashSet::new()),
            call_counts: RwLock::new(HashMap::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Fixture setup
    // ─────────────────────────────────────────────────────────────

    /// Add a role directly, bypassing failure injection
    pub fn add_role(&self, name: &str, permissions: CapabilitySet) -> Role {
        let mut state = self.state.write();
        let role = Role {
            id: RoleId(state.next_id),
            name: name.to_string(),
            permissions,
        };
        state.next_id += 1;
        state.roles.push(role.clone());
        role
    }

    /// Add a member holding no roles
    pub fn add_member(&self, id: u64, username: &str, bot: bool) -> MemberId {
        let member = Member {
            id: MemberId(id),
            username: username.to_string(),
            bot,
            roles: Vec::new(),
            joined_at: None,
        };
        self.state.write().members.push(member);
        MemberId(id)
    }

    /// Give a role to a member directly, bypassing failure injection
    pub fn grant(&self, member: MemberId, role: RoleId) {
        let mut state = self.state.write();
        if let Some(m) = state.members.iter_mut().find(|m| m.id == member) {
            if !m.roles.contains(&role) {
                m.roles.push(role);
            }
        }
    }

    /// Overwrite the `@everyone` permissions directly
    pub fn set_everyone(&self, permissions: CapabilitySet) {
        let everyone = self.community.everyone_role();
        let mut state = self.state.write();
        if let Some(role) = state.roles.iter_mut().find(|r| r.id == everyone) {
            role.permissions = permissions;
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Failure injection
    // ─────────────────────────────────────────────────────────────

    /// Make every subsequent call of `op` fail
    pub fn fail(&self, op: MockOp) {
        self.failing_ops.write().insert(op);
    }

    /// Stop failing `op`
    pub fn heal(&self, op: MockOp) {
        self.failing_ops.write().remove(&op);
    }

    /// Make role assignment fail for one member only
    pub fn fail_assign_for(&self, member: MemberId) {
        self.failing_members.write().insert(member);
    }

    // ─────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────

    pub fn roles(&self) -> Vec<Role> {
        self.state.read().roles.clone()
    }

    pub fn roles_named(&self, name: &str) -> Vec<Role> {
        self.state
            .read()
            .roles
            .iter()
            .filter(|r| r.name == name)
            .cloned()
            .collect()
    }

    pub fn member(&self, id: MemberId) -> Option<Member> {
        self.state.read().members.iter().find(|m| m.id == id).cloned()
    }

    /// Ids of members holding `role`, in membership order
    pub fn holders_of(&self, role: RoleId) -> Vec<MemberId> {
        self.state
            .read()
            .members
            .iter()
            .filter(|m| m.has_role(role))
            .map(|m| m.id)
            .collect()
    }

    pub fn everyone(&self) -> CapabilitySet {
        let everyone = self.community.everyone_role();
        self.state
            .read()
            .roles
            .iter()
            .find(|r| r.id == everyone)
            .map(|r| r.permissions)
            .unwrap_or_default()
    }

    /// Get the number of times an operation was called
    pub fn call_count(&self, op: MockOp) -> u32 {
        self.call_counts.read().get(&op).copied().unwrap_or(0)
    }

    fn enter(&self, op: MockOp, community: CommunityId) -> PlatformResult<()> {
        *self.call_counts.write().entry(op).or_insert(0) += 1;

        if community != self.community {
            return Err(PlatformError::Api {
                status: 404,
                message: format!("Unknown Guild {}", community),
            });
        }
        if self.failing_ops.read().contains(&op) {
            return Err(PlatformError::Api {
                status: 500,
                message: format!("mock failure: {:?}", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CommunityPlatform for MockPlatform {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_roles(&self, community: CommunityId) -> PlatformResult<Vec<Role>> {
        self.enter(MockOp::ListRoles, community)?;
        Ok(self.roles())
    }

    async fn create_role(
        &self,
        community: CommunityId,
        name: &str,
        permissions: CapabilitySet,
        _reason: &str,
    ) -> PlatformResult<Role> {
        self.enter(MockOp::CreateRole, community)?;
        Ok(self.add_role(name, permissions))
    }

    async fn delete_role(
        &self,
        community: CommunityId,
        role: &Role,
        _reason: &str,
    ) -> PlatformResult<()> {
        self.enter(MockOp::DeleteRole, community)?;

        let mut state = self.state.write();
        let before = state.roles.len();
        state.roles.retain(|r| r.id != role.id);
        if state.roles.len() == before {
            return Err(PlatformError::Api {
                status: 404,
                message: "Unknown Role".to_string(),
            });
        }
        for member in state.members.iter_mut() {
            member.roles.retain(|r| *r != role.id);
        }
        Ok(())
    }

    async fn list_members(&self, community: CommunityId) -> PlatformResult<Vec<Member>> {
        self.enter(MockOp::ListMembers, community)?;
        Ok(self.state.read().members.clone())
    }

    async fn assign_role(
        &self,
        community: CommunityId,
        member: &Member,
        role: &Role,
        _reason: &str,
    ) -> PlatformResult<()> {
        self.enter(MockOp::AssignRole, community)?;

        if self.failing_members.read().contains(&member.id) {
            return Err(PlatformError::Api {
                status: 403,
                message: "Missing Permissions".to_string(),
            });
        }
        if !self.state.read().roles.iter().any(|r| r.id == role.id) {
            return Err(PlatformError::Api {
                status: 404,
                message: "Unknown Role".to_string(),
            });
        }

        self.grant(member.id, role.id);
        Ok(())
    }

    async fn default_permissions(&self, community: CommunityId) -> PlatformResult<CapabilitySet> {
        self.enter(MockOp::DefaultPermissions, community)?;
        Ok(self.everyone())
    }

    async fn set_default_permissions(
        &self,
        community: CommunityId,
        permissions: CapabilitySet,
        _reason: &str,
    ) -> PlatformResult<()> {
        self.enter(MockOp::SetDefaultPermissions, community)?;
        self.set_everyone(permissions);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: CommunityId = CommunityId(1000);

    #[tokio::test]
    async fn test_everyone_role_listed() {
        let mock = MockPlatform::new(GUILD);
        let roles = mock.list_roles(GUILD).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].id, GUILD.everyone_role());
        assert!(mock.everyone().contains(CapabilitySet::SPEAK));
    }

    #[tokio::test]
    async fn test_delete_role_strips_members() {
        let mock = MockPlatform::new(GUILD);
        let role = mock.add_role("verified", CapabilitySet::empty());
        let alice = mock.add_member(1, "alice", false);
        mock.grant(alice, role.id);

        mock.delete_role(GUILD, &role, "test").await.unwrap();

        assert!(mock.roles_named("verified").is_empty());
        assert!(!mock.member(alice).unwrap().has_role(role.id));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let mock = MockPlatform::new(GUILD);
        mock.fail(MockOp::ListRoles);
        assert!(mock.list_roles(GUILD).await.is_err());

        mock.heal(MockOp::ListRoles);
        assert!(mock.list_roles(GUILD).await.is_ok());
        assert_eq!(mock.call_count(MockOp::ListRoles), 2);
    }

    #[tokio::test]
    async fn test_unknown_guild() {
        let mock = MockPlatform::new(GUILD);
        let err = mock.list_members(CommunityId(7)).await.unwrap_err();
        assert!(matches!(err, PlatformError::Api { status: 404, .. }));
    }
}
