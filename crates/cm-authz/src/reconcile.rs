//! Role-Permission Reconciler
//!
//! Turns "these modules are checked" into the grant and revoke requests
//! that make a role's persisted RoleModule rows match. Requests run one at
//! a time. A failed request is logged and recorded, and the loop moves on.
//! The role's grants are fetched again at the end, so the caller sees what
//! the backend actually holds.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use cm_client::dto::NewRoleModule;
use cm_client::{Actor, Error, Result};
use cm_common::{EntityId, Role, RoleModule};

use crate::batch::BatchReport;
use crate::gateway::RoleModuleGateway;

pub const NO_ROLE_SELECTED: &str = "Please select a role first";

/// One request in a reconcile batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Revoke { join_id: EntityId, module_id: EntityId },
    Grant { module_id: EntityId },
}

impl Mutation {
    pub fn module_id(&self) -> EntityId {
        match self {
            Mutation::Revoke { module_id, .. } | Mutation::Grant { module_id } => *module_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Module ids to grant, ascending
    pub to_add: Vec<EntityId>,
    /// Persisted rows to revoke, in the order they were listed
    pub to_remove: Vec<RoleModule>,
}

impl ReconcilePlan {
    pub fn compute(current: &[RoleModule], desired: &BTreeSet<EntityId>) -> Self {
        let existing: BTreeSet<EntityId> = current.iter().map(|rm| rm.module_id).collect();

        let to_add = desired.difference(&existing).copied().collect();
        let to_remove = current
            .iter()
            .filter(|rm| !desired.contains(&rm.module_id))
            .cloned()
            .collect();

        Self { to_add, to_remove }
    }

    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Requests in issue order: every revoke, then every grant.
    pub fn mutations(&self) -> Vec<Mutation> {
        let revokes = self.to_remove.iter().map(|rm| Mutation::Revoke {
            join_id: rm.id,
            module_id: rm.module_id,
        });
        let grants = self.to_add.iter().map(|&module_id| Mutation::Grant { module_id });
        revokes.chain(grants).collect()
    }
}

/// Issue every request in `plan` for `role`.
///
/// Only an expired session stops the batch early; it is returned as an
/// error since nothing after it can succeed.
pub async fn apply_plan<G>(
    gateway: &G,
    role: &Role,
    plan: &ReconcilePlan,
    actor: &Actor,
) -> Result<BatchReport<Mutation>>
where
    G: RoleModuleGateway + ?Sized,
{
    let mut report = BatchReport::new();

    for mutation in plan.mutations() {
        let result = match mutation {
            Mutation::Revoke { join_id, .. } => gateway.revoke(join_id).await,
            Mutation::Grant { module_id } => {
                let grant = NewRoleModule::new(role.id, module_id, role.practice_scope(), actor);
                gateway.grant(&grant).await
            }
        };

        match result {
            Ok(()) => {
                debug!(role_id = role.id, ?mutation, "Rights change applied");
                report.succeeded(mutation);
            }
            Err(Error::SessionExpired) => return Err(Error::SessionExpired),
            Err(e) => {
                warn!(
                    role_id = role.id,
                    module_id = mutation.module_id(),
                    ?mutation,
                    error = %e,
                    "Rights change failed, continuing"
                );
                report.failed(mutation, e.to_string());
            }
        }
    }

    Ok(report)
}

/// What a save did, and what the backend holds afterwards.
#[derive(Debug, Clone)]
pub struct RightsSaveReport {
    pub role_id: EntityId,
    pub batch: BatchReport<Mutation>,
    pub persisted: Vec<RoleModule>,
}

impl RightsSaveReport {
    /// Module ids granted to the role after the save, per the re-fetch.
    pub fn final_module_ids(&self) -> BTreeSet<EntityId> {
        self.persisted.iter().map(|rm| rm.module_id).collect()
    }
}

/// Make `role`'s grants match `desired`.
///
/// Failures of individual requests land in the batch report. The call
/// itself fails only when no role is given, when the session expires, or
/// when the grants cannot be read before or after the batch.
pub async fn save_rights<G>(
    gateway: &G,
    role: Option<&Role>,
    desired: &BTreeSet<EntityId>,
    actor: &Actor,
) -> Result<RightsSaveReport>
where
    G: RoleModuleGateway + ?Sized,
{
    let role = role.ok_or_else(|| Error::InvalidInput(NO_ROLE_SELECTED.into()))?;

    let current = gateway.grants(role.id).await?;
    let plan = ReconcilePlan::compute(&current, desired);
    info!(
        role_id = role.id,
        add = plan.to_add.len(),
        remove = plan.to_remove.len(),
        "Saving role rights"
    );

    let batch = apply_plan(gateway, role, &plan, actor).await?;
    let persisted = gateway.grants(role.id).await?;

    if !batch.all_succeeded() {
        warn!(role_id = role.id, result = %batch, "Role rights partially saved");
    }

    Ok(RightsSaveReport {
        role_id: role.id,
        batch,
        persisted,
    })
}
