//! Action-level authorization gate.
//!
//! A route declares which `(process, action, permission)` triple it
//! requires. The gate resolves the caller's active company, finds the
//! live process of that name in it, and allows the call only if one of
//! the caller's company groups in that company holds the permission on an
//! action of that process with the required name.

use std::collections::HashSet;

use tracing::{info, warn};
use urm_core::error::{UrmError, UrmResult};
use urm_core::models::action::Action;
use urm_core::models::grant::GrantSubject;
use urm_core::models::permission::{DO_ACTION, TargetKind};
use urm_core::models::process::Process;
use urm_core::models::user::User;
use urm_core::repository::{
    ActionRepository, CompanyGroupRepository, CrudRepository, ObjectPermissionRepository,
    ProcessRepository, UserRepository,
};
use uuid::Uuid;

/// What a guarded route requires of its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequirement {
    pub process_name: String,
    pub action_name: String,
    pub permission_codename: String,
}

impl ActionRequirement {
    pub fn new(
        process_name: impl Into<String>,
        action_name: impl Into<String>,
        permission_codename: impl Into<String>,
    ) -> Self {
        Self {
            process_name: process_name.into(),
            action_name: action_name.into(),
            permission_codename: permission_codename.into(),
        }
    }

    /// Require `dg_can_do_this_action` on `action` of `process`.
    pub fn do_action(process_name: impl Into<String>, action_name: impl Into<String>) -> Self {
        Self::new(process_name, action_name, DO_ACTION)
    }
}

/// The outcome of a successful gate check.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub user: User,
    pub process: Process,
    /// Actions of the process the caller was granted.
    pub actions: Vec<Action>,
}

pub struct AuthorizationGate<U, P, A, G, O>
where
    U: UserRepository,
    P: ProcessRepository,
    A: ActionRepository,
    G: CompanyGroupRepository,
    O: ObjectPermissionRepository,
{
    user_repo: U,
    process_repo: P,
    action_repo: A,
    company_group_repo: G,
    grant_repo: O,
}

impl<U, P, A, G, O> AuthorizationGate<U, P, A, G, O>
where
    U: UserRepository,
    P: ProcessRepository,
    A: ActionRepository,
    G: CompanyGroupRepository,
    O: ObjectPermissionRepository,
{
    pub fn new(
        user_repo: U,
        process_repo: P,
        action_repo: A,
        company_group_repo: G,
        grant_repo: O,
    ) -> Self {
        Self {
            user_repo,
            process_repo,
            action_repo,
            company_group_repo,
            grant_repo,
        }
    }

    /// Decide whether `user_id` may perform `requirement`.
    ///
    /// Fails with [`UrmError::NoActiveCompany`] when the user has not
    /// switched into a company, [`UrmError::ProcessNotFound`] when the
    /// company has no live process of that name, and
    /// [`UrmError::Unauthorized`] when no group grant covers a matching
    /// action.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        requirement: &ActionRequirement,
    ) -> UrmResult<Authorized> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let Some(company_id) = user.active_company_id else {
            warn!(%user_id, process = %requirement.process_name, "Gate denied: no active company");
            return Err(UrmError::NoActiveCompany);
        };

        let Some(process) = self
            .process_repo
            .find_by_name(company_id, &requirement.process_name)
            .await?
        else {
            warn!(
                %user_id,
                %company_id,
                process = %requirement.process_name,
                "Gate denied: process not found"
            );
            return Err(UrmError::ProcessNotFound {
                process_name: requirement.process_name.clone(),
            });
        };

        let subjects: Vec<GrantSubject> = self
            .company_group_repo
            .get_user_groups(user_id, Some(company_id))
            .await?
            .into_iter()
            .map(|group| GrantSubject::Group(group.id))
            .collect();

        let granted: HashSet<Uuid> = self
            .grant_repo
            .find_grants(
                &subjects,
                &requirement.permission_codename,
                TargetKind::Action,
            )
            .await?
            .into_iter()
            .map(|grant| grant.target.id)
            .collect();

        let actions: Vec<Action> = if granted.is_empty() {
            Vec::new()
        } else {
            self.action_repo
                .find_by_title(process.id, &requirement.action_name)
                .await?
                .into_iter()
                .filter(|action| granted.contains(&action.id))
                .collect()
        };

        if actions.is_empty() {
            warn!(
                %user_id,
                %company_id,
                process = %requirement.process_name,
                action = %requirement.action_name,
                permission = %requirement.permission_codename,
                "Gate denied: no matching grant"
            );
            return Err(UrmError::Unauthorized);
        }

        info!(
            %user_id,
            %company_id,
            process = %requirement.process_name,
            action = %requirement.action_name,
            "Gate allowed"
        );
        Ok(Authorized {
            user,
            process,
            actions,
        })
    }
}
