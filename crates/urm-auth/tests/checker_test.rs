//! Integration tests for object permission lookups, default permission
//! seeding and company switching.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use urm_auth::{MembershipService, PermissionChecker, ensure_default_permissions};
use urm_core::error::UrmError;
use urm_core::models::company::CreateCompany;
use urm_core::models::company_group::CreateCompanyGroup;
use urm_core::models::grant::{CreateObjectPermission, GrantSubject, PermissionTarget};
use urm_core::models::group::CreateGroup;
use urm_core::models::permission::{PermissionFilter, START_PROCESS, TargetKind, VIEW_PROCESS};
use urm_core::models::process::CreateProcess;
use urm_core::models::user::CreateUser;
use urm_core::repository::{
    CompanyGroupRepository, CrudRepository, Pagination, PermissionRepository,
};
use urm_db::repository::{
    SurrealCompanyGroupRepository, SurrealCompanyRepository, SurrealGroupRepository,
    SurrealObjectPermissionRepository, SurrealPermissionRepository, SurrealProcessRepository,
    SurrealUserRepository,
};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    urm_db::run_migrations(&db).await.unwrap();
    db
}

fn checker(
    db: &Surreal<Db>,
) -> PermissionChecker<SurrealCompanyGroupRepository<Db>, SurrealObjectPermissionRepository<Db>> {
    PermissionChecker::new(
        SurrealCompanyGroupRepository::new(db.clone()),
        SurrealObjectPermissionRepository::new(db.clone()),
    )
}

#[tokio::test]
async fn seeding_default_permissions_is_idempotent() {
    let db = setup().await;
    let repo = SurrealPermissionRepository::new(db);

    let first = ensure_default_permissions(&repo).await.unwrap();
    let second = ensure_default_permissions(&repo).await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(
        first.iter().map(|p| p.id).collect::<Vec<_>>(),
        second.iter().map(|p| p.id).collect::<Vec<_>>()
    );

    let all = repo
        .list(PermissionFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(
        repo.get_by_codename(START_PROCESS).await.unwrap().target_type,
        TargetKind::Process
    );
}

#[tokio::test]
async fn user_and_group_grants_both_count() {
    let db = setup().await;
    let permissions = ensure_default_permissions(&SurrealPermissionRepository::new(db.clone()))
        .await
        .unwrap();
    let view = permissions
        .iter()
        .find(|p| p.codename == VIEW_PROCESS)
        .unwrap();

    let company = SurrealCompanyRepository::new(db.clone())
        .create(CreateCompany {
            title: "Acme".into(),
        })
        .await
        .unwrap();
    let processes = SurrealProcessRepository::new(db.clone());
    let mut process_ids = Vec::new();
    for name in ["onboarding", "payroll", "offboarding"] {
        let process = processes
            .create(CreateProcess {
                company_id: company.id,
                created_by: None,
                name: name.into(),
            })
            .await
            .unwrap();
        process_ids.push(process.id);
    }

    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser::new("alice@example.com", "correct-horse"))
        .await
        .unwrap();
    let group = SurrealGroupRepository::new(db.clone())
        .create(CreateGroup {
            name: "Viewers".into(),
        })
        .await
        .unwrap();
    let company_groups = SurrealCompanyGroupRepository::new(db.clone());
    let viewers = company_groups
        .create(CreateCompanyGroup {
            company_id: company.id,
            group_id: group.id,
            name: None,
        })
        .await
        .unwrap();
    company_groups.add_member(viewers.id, user.id).await.unwrap();

    let grants = SurrealObjectPermissionRepository::new(db.clone());
    grants
        .create(CreateObjectPermission {
            subject: GrantSubject::User(user.id),
            permission_id: view.id,
            target: PermissionTarget::process(process_ids[0]),
        })
        .await
        .unwrap();
    grants
        .create(CreateObjectPermission {
            subject: GrantSubject::Group(viewers.id),
            permission_id: view.id,
            target: PermissionTarget::process(process_ids[1]),
        })
        .await
        .unwrap();

    let checker = checker(&db);
    let visible = checker
        .objects_for_user(user.id, VIEW_PROCESS, TargetKind::Process)
        .await
        .unwrap();
    assert_eq!(visible.len(), 2);
    assert!(visible.contains(&process_ids[0]));
    assert!(visible.contains(&process_ids[1]));

    assert!(
        checker
            .has_perm(user.id, VIEW_PROCESS, PermissionTarget::process(process_ids[1]))
            .await
            .unwrap()
    );
    assert!(
        !checker
            .has_perm(user.id, VIEW_PROCESS, PermissionTarget::process(process_ids[2]))
            .await
            .unwrap()
    );
    assert!(
        !checker
            .has_perm(user.id, START_PROCESS, PermissionTarget::process(process_ids[0]))
            .await
            .unwrap()
    );
    assert!(
        checker
            .objects_for_user(Uuid::new_v4(), VIEW_PROCESS, TargetKind::Process)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn switching_company_requires_membership() {
    let db = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let acme = companies
        .create(CreateCompany {
            title: "Acme".into(),
        })
        .await
        .unwrap();
    let globex = companies
        .create(CreateCompany {
            title: "Globex".into(),
        })
        .await
        .unwrap();
    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser::new("alice@example.com", "correct-horse"))
        .await
        .unwrap();

    let membership = MembershipService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealCompanyRepository::new(db.clone()),
    );

    let joined = membership.join_company(user.id, acme.id).await.unwrap();
    assert_eq!(joined.active_company_id, Some(acme.id));

    let err = membership
        .switch_company(user.id, globex.id)
        .await
        .unwrap_err();
    assert!(matches!(err, UrmError::Validation { .. }));

    // Joining a second company keeps the current one active.
    let joined = membership.join_company(user.id, globex.id).await.unwrap();
    assert_eq!(joined.active_company_id, Some(acme.id));

    let switched = membership.switch_company(user.id, globex.id).await.unwrap();
    assert_eq!(switched.active_company_id, Some(globex.id));

    let err = membership
        .switch_company(user.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, UrmError::NotFound { .. }));
}
