//! Route table.

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;
use urm_auth::ActionRequirement;

use crate::handlers::{
    auth, companies, grants, groups, health, org_chart, permissions, processes, users,
};
use crate::middleware::{GateState, require_action};
use crate::state::AppState;

/// The process / action pair guarding employee creation.
pub const ADD_EMPLOYEE_PROCESS: &str = "user_management";
pub const ADD_EMPLOYEE_ACTION: &str = "can_add_employee";

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login/", post(auth::login))
        .route("/refresh/", post(auth::refresh))
        .route("/verify/", post(auth::verify))
        .route("/logout/", post(auth::logout))
}

fn manage_routes(state: &AppState) -> Router<AppState> {
    let add_employee_gate = GateState::new(
        state,
        ActionRequirement::do_action(ADD_EMPLOYEE_PROCESS, ADD_EMPLOYEE_ACTION),
    );

    Router::new()
        .route("/register/", post(auth::register))
        // Users
        .route("/users/", get(users::list))
        .route("/users/me/", get(users::me))
        .route("/users/me/company/", put(users::switch_company))
        .route("/users/{id}", get(users::get).put(users::update))
        // Companies and groups
        .route("/companies/", get(companies::list).post(companies::create))
        .route("/companies/{id}", get(companies::get).put(companies::update))
        .route("/companies/{id}/users/", post(companies::add_user))
        .route("/groups/", get(groups::list).post(groups::create))
        .route("/groups/{id}", get(groups::get).put(groups::update))
        .route(
            "/company_groups/",
            get(groups::list_company_groups).post(groups::create_company_group),
        )
        .route(
            "/company_groups/{id}",
            get(groups::get_company_group).put(groups::update_company_group),
        )
        .route("/company_groups/{id}/members/", post(groups::add_member))
        // Permissions and grants
        .route(
            "/permissions/",
            get(permissions::list).post(permissions::create),
        )
        .route(
            "/permissions/{id}",
            get(permissions::get).put(permissions::update),
        )
        .route(
            "/user_object_permission/",
            get(grants::list_user_grants).post(grants::create_user_grant),
        )
        .route(
            "/user_object_permission/{id}",
            get(grants::get_user_grant)
                .put(grants::update_user_grant)
                .delete(grants::delete_user_grant),
        )
        .route(
            "/group_object_permission/",
            get(grants::list_group_grants).post(grants::create_group_grant),
        )
        .route(
            "/group_object_permission/{id}",
            get(grants::get_group_grant)
                .put(grants::update_group_grant)
                .delete(grants::delete_group_grant),
        )
        // Processes
        .route("/processes/", get(processes::list).post(processes::create))
        .route(
            "/processes/{id}",
            get(processes::get).put(processes::update),
        )
        .route(
            "/actions/",
            get(processes::list_actions).post(processes::create_action),
        )
        .route(
            "/actions/{id}",
            get(processes::get_action).put(processes::update_action),
        )
        // Organization chart
        .route(
            "/employees/",
            get(org_chart::list_employees).merge(
                post(org_chart::create_employee)
                    .route_layer(from_fn_with_state(add_employee_gate, require_action)),
            ),
        )
        .route(
            "/employees/{id}",
            get(org_chart::get_employee).put(org_chart::update_employee),
        )
        .route(
            "/departments/",
            get(org_chart::list_departments).post(org_chart::create_department),
        )
        .route(
            "/departments/{id}",
            get(org_chart::get_department).put(org_chart::update_department),
        )
        .route(
            "/company_departments/",
            get(org_chart::list_company_departments).post(org_chart::create_company_department),
        )
        .route(
            "/company_departments/{id}",
            get(org_chart::get_company_department).put(org_chart::update_company_department),
        )
        .route(
            "/company_department_employees/",
            get(org_chart::list_company_department_employees)
                .post(org_chart::create_company_department_employee),
        )
        .route(
            "/company_department_employees/{id}",
            get(org_chart::get_company_department_employee)
                .put(org_chart::update_company_department_employee),
        )
        .route(
            "/positions/",
            get(org_chart::list_positions).post(org_chart::create_position),
        )
        .route(
            "/positions/{id}",
            get(org_chart::get_position).put(org_chart::update_position),
        )
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/auth/jwt", auth_routes())
        .nest("/api/manage", manage_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
