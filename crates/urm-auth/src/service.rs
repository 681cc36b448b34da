//! Authentication service: registration, login, refresh rotation,
//! token verification and logout.

use chrono::{Duration, Utc};
use tracing::{info, warn};
use urm_core::error::{UrmError, UrmResult};
use urm_core::models::session::CreateSession;
use urm_core::models::user::{CreateUser, UpdateUser, User};
use urm_core::repository::{SessionRepository, UserRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, ValidatedClaims};

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug)]
pub struct RefreshInput {
    pub raw_refresh_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Access + refresh token pair returned by login and refresh.
#[derive(Debug)]
pub struct TokenPair {
    /// Signed JWT access token.
    pub access_token: String,
    /// Raw opaque refresh token (returned to the client, never stored).
    pub refresh_token: String,
    pub session_id: Uuid,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Lowercase and trim an email address, rejecting obviously malformed
/// input.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create a new account. The user row is written by a single
    /// statement, so a failed registration leaves nothing behind.
    pub async fn register(&self, input: RegisterInput) -> UrmResult<User> {
        let email = normalize_email(&input.email)?;
        if input.password != input.confirm_password {
            return Err(AuthError::PasswordMismatch.into());
        }
        password::check_policy(&input.password, self.config.min_password_length)?;

        let user = self
            .user_repo
            .create(CreateUser {
                first_name: input.first_name,
                last_name: input.last_name,
                ..CreateUser::new(email, input.password)
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Authenticate with email + password and issue tokens.
    pub async fn login(&self, input: LoginInput) -> UrmResult<TokenPair> {
        let email = normalize_email(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .get_by_email(&email)
            .await
            .map_err(|e| match e {
                UrmError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                other => other,
            })?;

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(user_id = %user.id, "Login rejected: bad password");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Login rejected: inactive account");
            return Err(AuthError::AccountInactive.into());
        }

        let pair = self
            .start_session(user.id, input.ip_address, input.user_agent)
            .await?;
        info!(user_id = %user.id, session_id = %pair.session_id, "User logged in");
        Ok(pair)
    }

    /// Rotate a refresh token: consume the old one, verify the user
    /// is still active, and issue a new token pair.
    ///
    /// Each refresh token is single-use; the old session is
    /// invalidated before the new one is created.
    pub async fn refresh(&self, input: RefreshInput) -> UrmResult<TokenPair> {
        let token_hash = token::hash_refresh_token(&input.raw_refresh_token);
        let session = self
            .session_repo
            .get_by_token_hash(&token_hash)
            .await
            .map_err(|e| match e {
                UrmError::NotFound { .. } => {
                    AuthError::TokenInvalid("refresh token not found or already used".into())
                        .into()
                }
                other => other,
            })?;

        self.session_repo.invalidate(session.id).await?;

        if session.expires_at <= Utc::now() {
            return Err(AuthError::TokenExpired.into());
        }

        let user = self.user_repo.get_by_id(session.user_id).await?;
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        self.start_session(user.id, input.ip_address, input.user_agent)
            .await
    }

    /// Check an access token's signature, issuer and expiry.
    pub fn verify(&self, access_token: &str) -> UrmResult<ValidatedClaims> {
        Ok(token::validate_access_token(access_token, &self.config)?)
    }

    /// Invalidate the session behind a refresh token.
    pub async fn logout(&self, raw_refresh_token: &str) -> UrmResult<()> {
        let token_hash = token::hash_refresh_token(raw_refresh_token);
        let session = self
            .session_repo
            .get_by_token_hash(&token_hash)
            .await
            .map_err(|e| match e {
                UrmError::NotFound { .. } => {
                    AuthError::TokenInvalid("refresh token not found or already used".into())
                        .into()
                }
                other => other,
            })?;

        self.session_repo.invalidate(session.id).await?;
        info!(user_id = %session.user_id, session_id = %session.id, "User logged out");
        Ok(())
    }

    /// Make sure an admin account exists for `email`. An existing user is
    /// promoted and keeps their password; otherwise the account is created
    /// with `password`, which must satisfy the password policy.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> UrmResult<User> {
        let email = normalize_email(email)?;
        match self.user_repo.get_by_email(&email).await {
            Ok(user) if user.is_admin => Ok(user),
            Ok(user) => {
                let user = self
                    .user_repo
                    .update(
                        user.id,
                        UpdateUser {
                            is_admin: Some(true),
                            ..Default::default()
                        },
                    )
                    .await?;
                info!(user_id = %user.id, "Existing user promoted to admin");
                Ok(user)
            }
            Err(UrmError::NotFound { .. }) => {
                password::check_policy(password, self.config.min_password_length)?;
                let user = self
                    .user_repo
                    .create(CreateUser {
                        is_admin: true,
                        is_staff: true,
                        ..CreateUser::new(email, password)
                    })
                    .await?;
                info!(user_id = %user.id, "Admin account created");
                Ok(user)
            }
            Err(e) => Err(e),
        }
    }

    /// Revoke all sessions for a user.
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> UrmResult<()> {
        self.session_repo.invalidate_user_sessions(user_id).await
    }

    async fn start_session(
        &self,
        user_id: Uuid,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> UrmResult<TokenPair> {
        let raw_refresh = token::generate_refresh_token();
        let expires_at =
            Utc::now() + Duration::seconds(self.config.refresh_token_lifetime_secs as i64);

        let session = self
            .session_repo
            .create(CreateSession {
                user_id,
                token_hash: token::hash_refresh_token(&raw_refresh),
                ip_address,
                user_agent,
                expires_at,
            })
            .await?;

        let access_token = token::issue_access_token(user_id, &self.config)?;

        Ok(TokenPair {
            access_token,
            refresh_token: raw_refresh,
            session_id: session.id,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }
}
