//! Application state shared across handlers.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use urm_auth::{AuthConfig, AuthService, AuthorizationGate, MembershipService, PermissionChecker};
use urm_db::{
    SurrealActionRepository, SurrealCompanyDepartmentEmployeeRepository,
    SurrealCompanyDepartmentRepository, SurrealCompanyGroupRepository, SurrealCompanyRepository,
    SurrealDepartmentRepository, SurrealEmployeeRepository, SurrealGroupRepository,
    SurrealObjectPermissionRepository, SurrealPermissionRepository, SurrealPositionRepository,
    SurrealProcessRepository, SurrealSessionRepository, SurrealUserRepository,
};

pub type Auth = AuthService<SurrealUserRepository<Any>, SurrealSessionRepository<Any>>;

pub type Gate = AuthorizationGate<
    SurrealUserRepository<Any>,
    SurrealProcessRepository<Any>,
    SurrealActionRepository<Any>,
    SurrealCompanyGroupRepository<Any>,
    SurrealObjectPermissionRepository<Any>,
>;

pub type Checker =
    PermissionChecker<SurrealCompanyGroupRepository<Any>, SurrealObjectPermissionRepository<Any>>;

pub type Membership = MembershipService<SurrealUserRepository<Any>, SurrealCompanyRepository<Any>>;

/// Cloned into every request. Repositories hold a cloned client handle.
#[derive(Clone)]
pub struct AppState {
    pub db: Surreal<Any>,
    pub auth: Arc<Auth>,
    pub gate: Arc<Gate>,
    pub checker: Arc<Checker>,
    pub membership: Arc<Membership>,

    pub users: SurrealUserRepository<Any>,
    pub companies: SurrealCompanyRepository<Any>,
    pub groups: SurrealGroupRepository<Any>,
    pub company_groups: SurrealCompanyGroupRepository<Any>,
    pub permissions: SurrealPermissionRepository<Any>,
    pub grants: SurrealObjectPermissionRepository<Any>,
    pub processes: SurrealProcessRepository<Any>,
    pub actions: SurrealActionRepository<Any>,
    pub employees: SurrealEmployeeRepository<Any>,
    pub departments: SurrealDepartmentRepository<Any>,
    pub company_departments: SurrealCompanyDepartmentRepository<Any>,
    pub company_department_employees: SurrealCompanyDepartmentEmployeeRepository<Any>,
    pub positions: SurrealPositionRepository<Any>,
}

impl AppState {
    pub fn new(db: Surreal<Any>, auth_config: AuthConfig) -> Self {
        let users = match &auth_config.pepper {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
            None => SurrealUserRepository::new(db.clone()),
        };
        let companies = SurrealCompanyRepository::new(db.clone());
        let company_groups = SurrealCompanyGroupRepository::new(db.clone());
        let grants = SurrealObjectPermissionRepository::new(db.clone());
        let processes = SurrealProcessRepository::new(db.clone());
        let actions = SurrealActionRepository::new(db.clone());

        let auth = AuthService::new(
            users.clone(),
            SurrealSessionRepository::new(db.clone()),
            auth_config,
        );
        let gate = AuthorizationGate::new(
            users.clone(),
            processes.clone(),
            actions.clone(),
            company_groups.clone(),
            grants.clone(),
        );
        let checker = PermissionChecker::new(company_groups.clone(), grants.clone());
        let membership = MembershipService::new(users.clone(), companies.clone());

        Self {
            auth: Arc::new(auth),
            gate: Arc::new(gate),
            checker: Arc::new(checker),
            membership: Arc::new(membership),
            users,
            companies,
            groups: SurrealGroupRepository::new(db.clone()),
            company_groups,
            permissions: SurrealPermissionRepository::new(db.clone()),
            grants,
            processes,
            actions,
            employees: SurrealEmployeeRepository::new(db.clone()),
            departments: SurrealDepartmentRepository::new(db.clone()),
            company_departments: SurrealCompanyDepartmentRepository::new(db.clone()),
            company_department_employees: SurrealCompanyDepartmentEmployeeRepository::new(
                db.clone(),
            ),
            positions: SurrealPositionRepository::new(db.clone()),
            db,
        }
    }
}
