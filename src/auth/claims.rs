use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ROLE_PREFIX: &str = "ROLE_";
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Claims read from an identity-provider access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Keycloak-style realm roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RealmAccess>,
    /// Single application role set as a custom user attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Folds the realm roles and the custom `app_role` claim into one set of
/// upper-cased, `ROLE_`-prefixed authorities.
pub fn roles_from_claims(claims: &Claims) -> BTreeSet<String> {
    let realm_roles = claims
        .realm_access
        .iter()
        .flat_map(|access| access.roles.iter());

    let app_role = claims
        .app_role
        .iter()
        .filter(|role| !role.trim().is_empty());

    realm_roles
        .chain(app_role)
        .map(|role| format!("{}{}", ROLE_PREFIX, role.trim().to_uppercase()))
        .collect()
}
