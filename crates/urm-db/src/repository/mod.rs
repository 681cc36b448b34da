//! SurrealDB repository implementations.

mod action;
mod company;
mod company_group;
mod department;
mod employee;
mod group;
mod object_permission;
mod permission;
mod position;
mod process;
mod session;
mod user;

pub use action::SurrealActionRepository;
pub use company::SurrealCompanyRepository;
pub use company_group::SurrealCompanyGroupRepository;
pub use department::{
    SurrealCompanyDepartmentEmployeeRepository, SurrealCompanyDepartmentRepository,
    SurrealDepartmentRepository,
};
pub use employee::SurrealEmployeeRepository;
pub use group::SurrealGroupRepository;
pub use object_permission::SurrealObjectPermissionRepository;
pub use permission::SurrealPermissionRepository;
pub use position::SurrealPositionRepository;
pub use process::SurrealProcessRepository;
pub use session::SurrealSessionRepository;
pub use user::SurrealUserRepository;
