//! Install pipeline
//!
//! Replaces the verified role, humanizes existing members and then withholds
//! the guarded capabilities from `@everyone`.

use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::LifecycleError;
use crate::platform::{find_role_by_name, CommunityId};

use super::{
    reasons, verified_role_permissions, InstallOutcome, PermissionChange, PermissionGuard,
    RoleLifecycle,
};

impl RoleLifecycle {
    /// Install the verified role in a guild.
    ///
    /// An existing role with the same name is deleted and recreated with the
    /// install-defined permissions, whatever it held before. A failure aborts
    /// the remaining steps but leaves earlier steps committed.
    pub async fn install(
        &self,
        community: CommunityId,
        role_name: &str,
    ) -> Result<InstallOutcome, LifecycleError> {
        let span = info_span!(
            "install",
            guild = %community,
            role = %role_name,
            run_id = %Uuid::new_v4()
        );

        async {
            info!(platform = self.platform.name(), "Executing install");

            let roles = self.platform.list_roles(community).await.map_err(|source| {
                error!(error = %source, "Failed to fetch roles");
                LifecycleError::RolesFetch { source }
            })?;

            let replaced_existing = match find_role_by_name(&roles, community, role_name) {
                Some(old) => {
                    self.platform
                        .delete_role(community, old, reasons::REPLACE)
                        .await
                        .map_err(|source| {
                            error!(role_id = %old.id, error = %source, "Failed to delete old role");
                            LifecycleError::OldRoleDelete { source }
                        })?;
                    info!(role_id = %old.id, "Old verified role removed");
                    true
                }
                None => false,
            };

            let role = self
                .platform
                .create_role(community, role_name, verified_role_permissions(), reasons::INSTALL)
                .await
                .map_err(|source| {
                    error!(error = %source, "Failed to create verified role");
                    LifecycleError::RoleCreate {
                        role_name: role_name.to_string(),
                        source,
                    }
                })?;
            info!(role_id = %role.id, "Verified role created");

            let humanized = self.humanize_members(community, role_name).await?;

            let default_permissions = PermissionGuard::new(&*self.platform)
                .commit(community, PermissionChange::Lockdown, reasons::INSTALL)
                .await
                .map_err(|source| {
                    error!(error = %source, "Failed to lock down @everyone permissions");
                    LifecycleError::Permissions { source }
                })?;

            info!(
                role_id = %role.id,
                replaced_existing,
                assigned = humanized.assigned,
                "Install finished"
            );

            Ok::<_, LifecycleError>(InstallOutcome {
                role,
                replaced_existing,
                humanized,
                default_permissions,
            })
        }
        .instrument(span)
        .await
    }
}
