//! Authentication configuration.

use jsonwebtoken::Algorithm;

use crate::error::AuthError;

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret used to sign and verify access tokens.
    pub jwt_secret: String,
    /// HMAC algorithm for access tokens (default: HS256).
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime in seconds (default: 7200 = 2 hours).
    pub access_token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: Algorithm::HS256,
            access_token_lifetime_secs: 7200,
            pepper: None,
            min_password_length: 8,
        }
    }
}

impl AuthConfig {
    /// Reject configurations that cannot sign tokens.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.is_empty() {
            return Err(AuthError::Crypto("JWT secret is not configured".into()));
        }
        if !matches!(
            self.jwt_algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::Crypto(format!(
                "unsupported JWT algorithm {:?}; expected an HMAC algorithm",
                self.jwt_algorithm
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_rejected() {
        assert!(AuthConfig::default().validate().is_err());
    }

    #[test]
    fn asymmetric_algorithm_is_rejected() {
        let config = AuthConfig {
            jwt_secret: "s3cret".into(),
            jwt_algorithm: Algorithm::RS256,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn hmac_config_is_accepted() {
        let config = AuthConfig {
            jwt_secret: "s3cret".into(),
            jwt_algorithm: Algorithm::HS512,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
