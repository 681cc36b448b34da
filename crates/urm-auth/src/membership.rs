//! Company membership and the active-company switch.

use tracing::{info, warn};
use urm_core::error::{UrmError, UrmResult};
use urm_core::models::user::User;
use urm_core::repository::{CompanyRepository, CrudRepository, UserRepository};
use uuid::Uuid;

pub struct MembershipService<U: UserRepository, C: CompanyRepository> {
    user_repo: U,
    company_repo: C,
}

impl<U: UserRepository, C: CompanyRepository> MembershipService<U, C> {
    pub fn new(user_repo: U, company_repo: C) -> Self {
        Self {
            user_repo,
            company_repo,
        }
    }

    /// Make `company_id` the company `user_id` acts in.
    ///
    /// The user must already be attached to the company.
    pub async fn switch_company(&self, user_id: Uuid, company_id: Uuid) -> UrmResult<User> {
        self.company_repo.get_by_id(company_id).await?;

        if !self.company_repo.is_member(company_id, user_id).await? {
            warn!(%user_id, %company_id, "Company switch rejected: not a member");
            return Err(UrmError::validation(
                "company",
                "You are not a member of this company.",
            ));
        }

        let user = self
            .user_repo
            .set_active_company(user_id, Some(company_id))
            .await?;
        info!(%user_id, %company_id, "Active company switched");
        Ok(user)
    }

    /// Attach a user to a company. The first company a user joins
    /// becomes their active company.
    pub async fn join_company(&self, user_id: Uuid, company_id: Uuid) -> UrmResult<User> {
        self.company_repo.get_by_id(company_id).await?;
        let user = self.user_repo.get_by_id(user_id).await?;

        self.company_repo.add_user(company_id, user_id).await?;
        info!(%user_id, %company_id, "User attached to company");

        if user.active_company_id.is_none() {
            return self
                .user_repo
                .set_active_company(user_id, Some(company_id))
                .await;
        }
        Ok(user)
    }
}
