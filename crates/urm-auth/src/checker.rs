//! Object permission lookups outside the gate.
//!
//! Unlike the gate, these checks are not restricted to the user's
//! active company: a user holds a permission on an object when the user
//! or any of their company groups holds a grant on it.

use std::collections::HashSet;

use tracing::info;
use urm_core::error::{UrmError, UrmResult};
use urm_core::models::grant::{GrantSubject, PermissionTarget};
use urm_core::models::permission::{Permission, TargetKind, default_permissions};
use urm_core::repository::{
    CompanyGroupRepository, CrudRepository, ObjectPermissionRepository, PermissionRepository,
};
use uuid::Uuid;

pub struct PermissionChecker<G: CompanyGroupRepository, O: ObjectPermissionRepository> {
    company_group_repo: G,
    grant_repo: O,
}

impl<G: CompanyGroupRepository, O: ObjectPermissionRepository> PermissionChecker<G, O> {
    pub fn new(company_group_repo: G, grant_repo: O) -> Self {
        Self {
            company_group_repo,
            grant_repo,
        }
    }

    async fn subjects(&self, user_id: Uuid) -> UrmResult<Vec<GrantSubject>> {
        let mut subjects = vec![GrantSubject::User(user_id)];
        subjects.extend(
            self.company_group_repo
                .get_user_groups(user_id, None)
                .await?
                .into_iter()
                .map(|group| GrantSubject::Group(group.id)),
        );
        Ok(subjects)
    }

    /// Whether the user holds `codename` on exactly `target`.
    pub async fn has_perm(
        &self,
        user_id: Uuid,
        codename: &str,
        target: PermissionTarget,
    ) -> UrmResult<bool> {
        Ok(self
            .objects_for_user(user_id, codename, target.kind)
            .await?
            .contains(&target.id))
    }

    /// Ids of every `kind` object the user holds `codename` on.
    pub async fn objects_for_user(
        &self,
        user_id: Uuid,
        codename: &str,
        kind: TargetKind,
    ) -> UrmResult<HashSet<Uuid>> {
        let subjects = self.subjects(user_id).await?;
        let grants = self.grant_repo.find_grants(&subjects, codename, kind).await?;
        Ok(grants.into_iter().map(|grant| grant.target.id).collect())
    }
}

/// Create any missing built-in permission. Safe to run on every start.
pub async fn ensure_default_permissions<P: PermissionRepository>(
    repo: &P,
) -> UrmResult<Vec<Permission>> {
    let mut permissions = Vec::new();
    for input in default_permissions() {
        let permission = match repo.get_by_codename(&input.codename).await {
            Ok(existing) => existing,
            Err(UrmError::NotFound { .. }) => {
                let created = repo.create(input).await?;
                info!(codename = %created.codename, "Seeded permission");
                created
            }
            Err(e) => return Err(e),
        };
        permissions.push(permission);
    }
    Ok(permissions)
}
