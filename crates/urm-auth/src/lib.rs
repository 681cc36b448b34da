//! URM Auth: password authentication, JWT issuance/validation,
//! object-permission checks and the action authorization gate.

pub mod checker;
pub mod config;
pub mod error;
pub mod gate;
pub mod membership;
pub mod password;
pub mod service;
pub mod token;

pub use checker::{PermissionChecker, ensure_default_permissions};
pub use config::AuthConfig;
pub use error::AuthError;
pub use gate::{ActionRequirement, AuthorizationGate, Authorized};
pub use membership::MembershipService;
pub use service::{AuthService, LoginInput, RefreshInput, RegisterInput, TokenPair};
pub use token::{AccessTokenClaims, ValidatedClaims};
