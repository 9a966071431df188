use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::claims::Claims;
use crate::config::{ConfigError, JwtKey, JwtSettings};
use crate::utils::error::{AppError, AppResult};

/// Checks bearer token signatures and expiry.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn from_settings(settings: &JwtSettings) -> Result<Self, ConfigError> {
        let (key, algorithm) = match &settings.key {
            JwtKey::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            JwtKey::RsaPublicKeyPem(pem) => {
                let key =
                    DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| ConfigError::Invalid {
                        key: "JWT_PUBLIC_KEY_PEM".to_string(),
                        details: e.to_string(),
                    })?;
                (key, Algorithm::RS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        // Access tokens are issued for the frontend client, not for this service.
        validation.validate_aud = false;
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }

    pub fn hs256(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT verification failed: {}", e);
                AppError::AuthError("Invalid or expired token".to_string())
            })
    }
}
