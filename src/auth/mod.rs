//! Bearer-token authentication.
//!
//! Handlers opt in by taking [`AuthUser`] (any valid token) or [`AdminUser`]
//! (token carrying `ROLE_ADMIN`) as an extractor. Public handlers take
//! neither.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

pub mod claims;
pub mod verifier;

pub use claims::{roles_from_claims, Claims, RealmAccess, ADMIN_ROLE};
pub use verifier::JwtVerifier;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// A caller whose token was verified.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
    pub roles: BTreeSet<String>,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Self {
        let roles = roles_from_claims(&claims);
        Self {
            subject: claims.sub,
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// The subject as a user id, for requests that default to "me".
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.subject).map_err(|_| {
            AppError::ValidationError(format!(
                "Token subject '{}' is not a user id; supply one explicitly",
                self.subject
            ))
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<JwtVerifier>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::AuthError("No token provided".to_string()))?;

        let verifier = Arc::<JwtVerifier>::from_ref(state);
        let claims = verifier.verify(token)?;

        Ok(AuthUser::from_claims(claims))
    }
}

/// A verified caller holding `ROLE_ADMIN`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<JwtVerifier>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            tracing::debug!(subject = %user.subject, "Admin role required");
            return Err(AppError::Forbidden(
                "Administrator role required".to_string(),
            ));
        }

        Ok(AdminUser(user))
    }
}
