//! Request authentication, the action gate layer and input extractors.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use serde::de::DeserializeOwned;
use urm_auth::{ActionRequirement, AuthError};
use urm_core::error::UrmError;
use urm_core::models::user::User;
use urm_core::repository::CrudRepository;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the bearer token in `headers` to an active user.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::TokenInvalid("missing bearer token".into()))?;

    let claims = state.auth.verify(token.trim())?;
    let user = state.users.get_by_id(claims.user_id).await.map_err(|e| match e {
        UrmError::NotFound { .. } => UrmError::from(AuthError::InvalidCredentials),
        other => other,
    })?;

    if !user.is_active {
        return Err(AuthError::AccountInactive.into());
    }
    Ok(user)
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    /// Reject callers without the admin flag.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.0.is_admin {
            Ok(())
        } else {
            Err(ApiError(UrmError::Unauthorized))
        }
    }

    /// The company the caller is acting in.
    pub fn active_company(&self) -> Result<Uuid, ApiError> {
        self.0
            .active_company_id
            .ok_or(ApiError(UrmError::NoActiveCompany))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        authenticate(state, &parts.headers).await.map(CurrentUser)
    }
}

/// State of one gated route: the app state and what the route requires.
#[derive(Clone)]
pub struct GateState {
    app: AppState,
    requirement: Arc<ActionRequirement>,
}

impl GateState {
    pub fn new(app: &AppState, requirement: ActionRequirement) -> Self {
        Self {
            app: app.clone(),
            requirement: Arc::new(requirement),
        }
    }
}

/// Route layer that runs the authorization gate before the handler.
///
/// Use with `axum::middleware::from_fn_with_state(GateState::new(..), require_action)`.
/// On success the caller and the gate's decision are stored in the
/// request extensions.
pub async fn require_action(
    State(gate): State<GateState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&gate.app, request.headers()).await?;
    let authorized = gate.app.gate.authorize(user.id, &gate.requirement).await?;

    request.extensions_mut().insert(CurrentUser(authorized.user.clone()));
    request.extensions_mut().insert(authorized);
    Ok(next.run(request).await)
}

/// JSON body extractor whose rejections use the error envelope.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    UrmError::validation("body", rejection.body_text()).into()
}

/// Query-string extractor whose rejections use the error envelope.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(query_rejection(rejection)),
        }
    }
}

fn query_rejection(rejection: QueryRejection) -> ApiError {
    UrmError::validation("query", rejection.body_text()).into()
}

/// A record id taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for IdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => Err(UrmError::validation("id", rejection.body_text()).into()),
        }
    }
}
