//! Role-based access control.
//!
//! [`authorize`] is the pure check. [`AccessGuard::admit`] wraps it and
//! writes one audit entry for every permitted request.

use std::sync::Arc;

use clinica_core::models::audit::Actor;
use clinica_core::models::user::Role;
use clinica_core::repository::AuditLogRepository;

use crate::audit::AuditWriter;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::{self, AccessTokenClaims};

/// What the guard needs to know about the incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    /// Raw bearer token from the `Authorization` header, if present.
    pub bearer: Option<String>,
}

impl RequestContext {
    /// Extract the token from an `Authorization` header value. The
    /// scheme is matched case-insensitively.
    pub fn parse_bearer(header: &str) -> Option<String> {
        let (scheme, token) = header.trim().split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
    }

    /// Best-effort identity of the caller for audit records on routes
    /// that do not require a role. Invalid tokens count as anonymous.
    pub fn actor(&self, config: &AuthConfig) -> Actor {
        self.bearer
            .as_deref()
            .and_then(|t| token::decode_access_token(t, config).ok())
            .map(|claims| Actor::Identified {
                email: claims.email,
                role: claims.role,
            })
            .unwrap_or(Actor::Anonymous)
    }
}

/// Verify the bearer token regardless of role.
pub fn authenticate(
    bearer: Option<&str>,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let token = bearer.ok_or(AuthError::MissingToken)?;
    token::decode_access_token(token, config)
}

/// Admit the bearer iff the token verifies and carries `required`.
///
/// A missing, malformed, forged or expired token is
/// [`AuthError::MissingToken`] / [`AuthError::TokenInvalid`] /
/// [`AuthError::TokenExpired`]; a valid token with another role is
/// [`AuthError::Forbidden`].
pub fn authorize(
    required: Role,
    bearer: Option<&str>,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let claims = authenticate(bearer, config)?;
    if claims.role != required {
        return Err(AuthError::Forbidden);
    }
    Ok(claims)
}

/// Request-scoped role check with an audit side effect.
#[derive(Clone)]
pub struct AccessGuard<A: AuditLogRepository> {
    config: Arc<AuthConfig>,
    audit: AuditWriter<A>,
}

impl<A: AuditLogRepository> AccessGuard<A> {
    pub fn new(config: Arc<AuthConfig>, audit: AuditWriter<A>) -> Self {
        Self { config, audit }
    }

    /// Check the request and, on success, record exactly one audit
    /// entry describing the permitted action. Rejections record nothing.
    pub async fn admit(
        &self,
        required: Role,
        ctx: &RequestContext,
    ) -> Result<AccessTokenClaims, AuthError> {
        let claims = authorize(required, ctx.bearer.as_deref(), &self.config)?;

        self.audit
            .record(
                Actor::Identified {
                    email: claims.email.clone(),
                    role: claims.role,
                },
                &ctx.method,
                &ctx.path,
                format!("Acesso permitido ao perfil {required}"),
            )
            .await;

        Ok(claims)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn audit(&self) -> &AuditWriter<A> {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clinica_core::models::user::User;
    use uuid::Uuid;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "guard-secret".into(),
            ..Default::default()
        }
    }

    fn token_for(role: Role, config: &AuthConfig) -> String {
        let user = User {
            id: Uuid::new_v4(),
            name: "Teste".into(),
            email: "teste@clinica.com".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        };
        token::issue_access_token(&user, config).unwrap()
    }

    #[test]
    fn matching_role_is_admitted() {
        let config = config();
        let token = token_for(Role::Admin, &config);
        let claims = authorize(Role::Admin, Some(&token), &config).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn other_role_is_forbidden() {
        let config = config();
        let token = token_for(Role::Patient, &config);
        let err = authorize(Role::Admin, Some(&token), &config).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }

    #[test]
    fn authenticate_accepts_any_role() {
        let config = config();
        let token = token_for(Role::Patient, &config);
        let claims = authenticate(Some(&token), &config).unwrap();
        assert_eq!(claims.role, Role::Patient);
        assert!(matches!(
            authenticate(None, &config).unwrap_err(),
            AuthError::MissingToken
        ));
    }

    #[test]
    fn missing_token_is_unauthenticated() {
        let err = authorize(Role::Admin, None, &config()).unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[test]
    fn forged_token_is_unauthenticated_not_forbidden() {
        let forger = AuthConfig {
            jwt_secret: "forged".into(),
            ..Default::default()
        };
        let token = token_for(Role::Patient, &forger);
        let err = authorize(Role::Admin, Some(&token), &config()).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(
            RequestContext::parse_bearer("Bearer abc.def"),
            Some("abc.def".to_string())
        );
        assert_eq!(
            RequestContext::parse_bearer("bearer xyz"),
            Some("xyz".to_string())
        );
        assert_eq!(RequestContext::parse_bearer("Basic abc"), None);
        assert_eq!(RequestContext::parse_bearer("Bearer "), None);
        assert_eq!(RequestContext::parse_bearer("Bearer"), None);
    }

    #[test]
    fn actor_falls_back_to_anonymous() {
        let config = config();
        let ctx = RequestContext {
            bearer: Some("junk".into()),
            ..Default::default()
        };
        assert_eq!(ctx.actor(&config), Actor::Anonymous);

        let ctx = RequestContext {
            bearer: Some(token_for(Role::Professional, &config)),
            ..Default::default()
        };
        assert_eq!(
            ctx.actor(&config),
            Actor::Identified {
                email: "teste@clinica.com".into(),
                role: Role::Professional,
            }
        );
    }
}
