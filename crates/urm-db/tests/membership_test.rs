//! Integration tests for users, company membership and company groups.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use urm_core::error::UrmError;
use urm_core::models::company::{Company, CreateCompany};
use urm_core::models::company_group::{
    CompanyGroupFilter, CreateCompanyGroup, UpdateCompanyGroup,
};
use urm_core::models::group::CreateGroup;
use urm_core::models::user::{CreateUser, UpdateUser, User, UserType};
use urm_core::repository::{
    CompanyGroupRepository, CompanyRepository, CrudRepository, Pagination, UserRepository,
};
use urm_db::repository::{
    SurrealCompanyGroupRepository, SurrealCompanyRepository, SurrealGroupRepository,
    SurrealUserRepository,
};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    urm_db::run_migrations(&db).await.unwrap();
    db
}

async fn company(db: &Surreal<Db>, title: &str) -> Company {
    SurrealCompanyRepository::new(db.clone())
        .create(CreateCompany {
            title: title.into(),
        })
        .await
        .unwrap()
}

async fn user(db: &Surreal<Db>, email: &str) -> User {
    SurrealUserRepository::new(db.clone())
        .create(CreateUser::new(email, "correct-horse"))
        .await
        .unwrap()
}

#[tokio::test]
async fn user_create_hashes_password_and_applies_defaults() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let created = repo
        .create(CreateUser::new("alice@example.com", "correct-horse"))
        .await
        .unwrap();
    assert!(created.password_hash.starts_with("$argon2id$"));
    assert!(created.is_active);
    assert!(!created.is_admin);
    assert_eq!(created.user_type, UserType::Customer);
    assert_eq!(created.active_company_id, None);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, created.id);

    let err = repo
        .create(CreateUser::new("alice@example.com", "another-one"))
        .await
        .unwrap_err();
    assert!(matches!(err, UrmError::AlreadyExists { .. }));

    let updated = repo
        .update(
            created.id,
            UpdateUser {
                first_name: Some("Alice".into()),
                user_type: Some(UserType::Staff),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name.as_deref(), Some("Alice"));
    assert_eq!(updated.user_type, UserType::Staff);
    assert_eq!(updated.password_hash, created.password_hash);
}

#[tokio::test]
async fn company_membership_and_active_company() {
    let db = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());

    let acme = company(&db, "Acme").await;
    let globex = company(&db, "Globex").await;
    let alice = user(&db, "alice@example.com").await;

    assert!(!companies.is_member(acme.id, alice.id).await.unwrap());
    companies.add_user(acme.id, alice.id).await.unwrap();
    // Attaching twice is a no-op.
    companies.add_user(acme.id, alice.id).await.unwrap();
    assert!(companies.is_member(acme.id, alice.id).await.unwrap());
    assert!(!companies.is_member(globex.id, alice.id).await.unwrap());

    let mine = companies.list_for_user(alice.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, acme.id);
    assert_eq!(companies.member_ids(acme.id).await.unwrap(), vec![alice.id]);
    assert!(companies.member_ids(globex.id).await.unwrap().is_empty());

    let err = companies
        .add_user(acme.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, UrmError::NotFound { .. }));

    let switched = users
        .set_active_company(alice.id, Some(acme.id))
        .await
        .unwrap();
    assert_eq!(switched.active_company_id, Some(acme.id));
    let cleared = users.set_active_company(alice.id, None).await.unwrap();
    assert_eq!(cleared.active_company_id, None);
}

#[tokio::test]
async fn company_group_name_defaults_to_company_and_group() {
    let db = setup().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let company_groups = SurrealCompanyGroupRepository::new(db.clone());

    let acme = company(&db, "Acme").await;
    let managers = groups
        .create(CreateGroup {
            name: "Managers".into(),
        })
        .await
        .unwrap();

    let defaulted = company_groups
        .create(CreateCompanyGroup {
            company_id: acme.id,
            group_id: managers.id,
            name: None,
        })
        .await
        .unwrap();
    assert_eq!(defaulted.name, "Acme_Managers");

    let err = company_groups
        .create(CreateCompanyGroup {
            company_id: acme.id,
            group_id: managers.id,
            name: Some("Other".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, UrmError::AlreadyExists { .. }));

    let err = company_groups
        .create(CreateCompanyGroup {
            company_id: Uuid::new_v4(),
            group_id: managers.id,
            name: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, UrmError::NotFound { .. }));
}

#[tokio::test]
async fn user_groups_are_scoped_by_company() {
    let db = setup().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let company_groups = SurrealCompanyGroupRepository::new(db.clone());

    let acme = company(&db, "Acme").await;
    let globex = company(&db, "Globex").await;
    let alice = user(&db, "alice@example.com").await;
    let staff = groups
        .create(CreateGroup {
            name: "Staff".into(),
        })
        .await
        .unwrap();

    let acme_staff = company_groups
        .create(CreateCompanyGroup {
            company_id: acme.id,
            group_id: staff.id,
            name: None,
        })
        .await
        .unwrap();
    let globex_staff = company_groups
        .create(CreateCompanyGroup {
            company_id: globex.id,
            group_id: staff.id,
            name: None,
        })
        .await
        .unwrap();

    company_groups
        .add_member(acme_staff.id, alice.id)
        .await
        .unwrap();
    company_groups
        .add_member(acme_staff.id, alice.id)
        .await
        .unwrap();
    company_groups
        .add_member(globex_staff.id, alice.id)
        .await
        .unwrap();

    let all = company_groups.get_user_groups(alice.id, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let scoped = company_groups
        .get_user_groups(alice.id, Some(acme.id))
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].id, acme_staff.id);

    company_groups
        .remove_member(acme_staff.id, alice.id)
        .await
        .unwrap();
    assert!(
        company_groups
            .get_user_groups(alice.id, Some(acme.id))
            .await
            .unwrap()
            .is_empty()
    );

    let listed = company_groups
        .list(
            CompanyGroupFilter {
                company_id: Some(globex.id),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.items[0].name, "Globex_Staff");
}

#[tokio::test]
async fn company_group_references_must_exist() {
    let db = setup().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let company_groups = SurrealCompanyGroupRepository::new(db.clone());

    let acme = company(&db, "Acme").await;
    let staff = groups
        .create(CreateGroup {
            name: "Staff".into(),
        })
        .await
        .unwrap();

    // An explicit name does not skip the reference checks.
    for (company_id, group_id) in [(Uuid::new_v4(), staff.id), (acme.id, Uuid::new_v4())] {
        let err = company_groups
            .create(CreateCompanyGroup {
                company_id,
                group_id,
                name: Some("Named".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UrmError::NotFound { .. }));
    }
    let listed = company_groups
        .list(CompanyGroupFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);

    let acme_staff = company_groups
        .create(CreateCompanyGroup {
            company_id: acme.id,
            group_id: staff.id,
            name: Some("Acme staff".into()),
        })
        .await
        .unwrap();

    for update in [
        UpdateCompanyGroup {
            company_id: Some(Uuid::new_v4()),
            ..Default::default()
        },
        UpdateCompanyGroup {
            group_id: Some(Uuid::new_v4()),
            ..Default::default()
        },
    ] {
        let err = company_groups
            .update(acme_staff.id, update)
            .await
            .unwrap_err();
        assert!(matches!(err, UrmError::NotFound { .. }));
    }

    let unchanged = company_groups.get_by_id(acme_staff.id).await.unwrap();
    assert_eq!(unchanged.company_id, acme.id);
    assert_eq!(unchanged.group_id, staff.id);
}

#[tokio::test]
async fn company_group_moves_only_with_its_members() {
    let db = setup().await;
    let companies = SurrealCompanyRepository::new(db.clone());
    let company_groups = SurrealCompanyGroupRepository::new(db.clone());

    let acme = company(&db, "Acme").await;
    let globex = company(&db, "Globex").await;
    let alice = user(&db, "alice@example.com").await;
    companies.add_user(acme.id, alice.id).await.unwrap();

    let staff = SurrealGroupRepository::new(db.clone())
        .create(CreateGroup {
            name: "Staff".into(),
        })
        .await
        .unwrap();
    let acme_staff = company_groups
        .create(CreateCompanyGroup {
            company_id: acme.id,
            group_id: staff.id,
            name: None,
        })
        .await
        .unwrap();
    company_groups
        .add_member(acme_staff.id, alice.id)
        .await
        .unwrap();

    let move_to_globex = || UpdateCompanyGroup {
        company_id: Some(globex.id),
        ..Default::default()
    };
    let err = company_groups
        .update(acme_staff.id, move_to_globex())
        .await
        .unwrap_err();
    assert!(matches!(err, UrmError::Validation { ref params, .. } if params == "company_id"));
    assert_eq!(
        company_groups.get_by_id(acme_staff.id).await.unwrap().company_id,
        acme.id
    );

    companies.add_user(globex.id, alice.id).await.unwrap();
    let moved = company_groups
        .update(acme_staff.id, move_to_globex())
        .await
        .unwrap();
    assert_eq!(moved.company_id, globex.id);
    assert_eq!(
        company_groups
            .get_user_groups(alice.id, Some(globex.id))
            .await
            .unwrap()
            .len(),
        1
    );
}
