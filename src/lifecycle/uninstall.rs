//! Uninstall pipeline
//!
//! Deletes the verified role and gives the guarded capabilities back to
//! `@everyone`.

use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::LifecycleError;
use crate::platform::{find_role_by_name, CommunityId};

use super::{reasons, PermissionChange, PermissionGuard, RoleLifecycle, UninstallOutcome};

impl RoleLifecycle {
    /// Remove the verified role and restore `@everyone`.
    ///
    /// A guild without the role is not an error: permissions are still
    /// restored and [`UninstallOutcome::NoSuchRole`] is returned.
    pub async fn uninstall(
        &self,
        community: CommunityId,
        role_name: &str,
    ) -> Result<UninstallOutcome, LifecycleError> {
        let span = info_span!(
            "uninstall",
            guild = %community,
            role = %role_name,
            run_id = %Uuid::new_v4()
        );

        async {
            info!(platform = self.platform.name(), "Executing uninstall");

            let roles = self.platform.list_roles(community).await.map_err(|source| {
                error!(error = %source, "Failed to fetch roles");
                LifecycleError::RolesFetch { source }
            })?;

            let removed = match find_role_by_name(&roles, community, role_name) {
                Some(role) => {
                    self.platform
                        .delete_role(community, role, reasons::UNINSTALL)
                        .await
                        .map_err(|source| {
                            error!(role_id = %role.id, error = %source, "Failed to delete verified role");
                            LifecycleError::RoleDelete { source }
                        })?;
                    info!(role_id = %role.id, "Verified role removed");
                    Some(role.clone())
                }
                None => {
                    info!("No verified role to remove");
                    None
                }
            };

            let default_permissions = PermissionGuard::new(&*self.platform)
                .commit(community, PermissionChange::Restore, reasons::UNINSTALL)
                .await
                .map_err(|source| {
                    error!(error = %source, "Failed to restore @everyone permissions");
                    LifecycleError::Permissions { source }
                })?;

            info!("Uninstall finished");

            Ok::<_, LifecycleError>(match removed {
                Some(role) => UninstallOutcome::Removed {
                    role,
                    default_permissions,
                },
                None => UninstallOutcome::NoSuchRole { default_permissions },
            })
        }
        .instrument(span)
        .await
    }
}
