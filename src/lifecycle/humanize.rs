//! Humanize pipeline
//!
//! Gives the verified role to every member who lacks it and passes the
//! configured verifier.

use futures_util::stream::{self, TryStreamExt};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::HumanizeError;
use crate::platform::{find_role_by_name, CommunityId, Member};

use super::{reasons, HumanizeOutcome, RoleLifecycle};

impl RoleLifecycle {
    /// Retroactively assign `role_name` to every member that passes verification.
    ///
    /// Members that already hold the role are left alone, so running this twice
    /// yields the same assignment set. If one assignment fails the pipeline
    /// stops; members handled before it keep the role.
    pub async fn humanize(
        &self,
        community: CommunityId,
        role_name: &str,
    ) -> Result<HumanizeOutcome, HumanizeError> {
        let span = info_span!(
            "humanize",
            guild = %community,
            role = %role_name,
            run_id = %Uuid::new_v4()
        );
        self.humanize_members(community, role_name)
            .instrument(span)
            .await
    }

    /// Humanize without opening a new span; install calls this inside its own.
    pub(super) async fn humanize_members(
        &self,
        community: CommunityId,
        role_name: &str,
    ) -> Result<HumanizeOutcome, HumanizeError> {
        info!(verifier = self.verifier.name(), "Humanizing members");

        let members = self.platform.list_members(community).await.map_err(|source| {
            error!(error = %source, "Failed to fetch members");
            HumanizeError::MembersFetch { source }
        })?;

        let roles = self.platform.list_roles(community).await.map_err(|source| {
            error!(error = %source, "Failed to fetch roles");
            HumanizeError::RolesFetch { source }
        })?;

        let role = find_role_by_name(&roles, community, role_name)
            .cloned()
            .ok_or_else(|| {
                error!("Verified role not found");
                HumanizeError::RoleNotFound {
                    role_name: role_name.to_string(),
                }
            })?;

        let mut already_verified = 0;
        let mut rejected = 0;
        let mut pending: Vec<Member> = Vec::new();

        for member in members {
            if member.has_role(role.id) {
                already_verified += 1;
            } else if self.verifier.verify(&member).await.passed() {
                pending.push(member);
            } else {
                debug!(member = %member.id, username = %member.username, "Member failed verification");
                rejected += 1;
            }
        }

        debug!(
            pending = pending.len(),
            already_verified,
            rejected,
            concurrency = self.concurrency,
            "Assigning verified role"
        );

        let role = &role;
        stream::iter(pending.iter().map(Ok::<_, HumanizeError>))
            .try_for_each_concurrent(self.concurrency, |member| async move {
                self.platform
                    .assign_role(community, member, role, reasons::HUMANIZE)
                    .await
                    .map_err(|source| {
                        error!(
                            member = %member.id,
                            username = %member.username,
                            error = %source,
                            "Failed to assign verified role"
                        );
                        HumanizeError::Assign {
                            username: member.username.clone(),
                            source,
                        }
                    })?;
                debug!(member = %member.id, "Verified role assigned");
                Ok(())
            })
            .await?;

        let outcome = HumanizeOutcome {
            assigned: pending.len(),
            already_verified,
            rejected,
        };
        info!(
            assigned = outcome.assigned,
            already_verified = outcome.already_verified,
            rejected = outcome.rejected,
            "Humanize finished"
        );
        Ok(outcome)
    }
}
