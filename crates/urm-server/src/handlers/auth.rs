//! Token endpoints and registration.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use urm_auth::{LoginInput, RefreshInput, RegisterInput, TokenPair};
use urm_core::models::user::User;
use uuid::Uuid;

use super::{Single, ok};
use crate::middleware::ValidJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub expires_in: u64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access: pair.access_token,
            refresh: pair.refresh_token,
            expires_in: pair.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user_id: Uuid,
    pub exp: i64,
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Single<TokenResponse> {
    let pair = state
        .auth
        .login(LoginInput {
            email: body.email,
            password: body.password,
            ip_address: client_ip(&headers),
            user_agent: user_agent(&headers),
        })
        .await?;
    ok(pair.into())
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(body): ValidJson<RefreshRequest>,
) -> Single<TokenResponse> {
    let pair = state
        .auth
        .refresh(RefreshInput {
            raw_refresh_token: body.refresh,
            ip_address: client_ip(&headers),
            user_agent: user_agent(&headers),
        })
        .await?;
    ok(pair.into())
}

pub async fn verify(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<VerifyRequest>,
) -> Single<VerifyResponse> {
    let validated = state.auth.verify(&body.token)?;
    ok(VerifyResponse {
        user_id: validated.user_id,
        exp: validated.claims.exp,
    })
}

pub async fn logout(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LogoutRequest>,
) -> Single<Value> {
    state.auth.logout(&body.refresh_token).await?;
    ok(Value::Object(Map::new()))
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Single<User> {
    let user = state
        .auth
        .register(RegisterInput {
            email: body.email,
            password: body.password,
            confirm_password: body.confirm_password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;
    ok(user)
}
