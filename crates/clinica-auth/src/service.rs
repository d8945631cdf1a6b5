//! Authentication service — registration, login and credential
//! rotation.

use clinica_core::error::{ClinicaError, ClinicaResult};
use clinica_core::models::user::{CreateUser, NewUser, User};
use clinica_core::repository::UserRepository;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// Successful login result.
#[derive(Debug, Serialize)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    fn check_policy(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::WeakPassword {
                min: self.config.min_password_length,
            });
        }
        Ok(())
    }

    /// Register a new identity. A taken email is a `Conflict`.
    pub async fn register(&self, input: CreateUser) -> ClinicaResult<User> {
        input.validate()?;
        self.check_policy(&input.password)?;

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let user = self
            .user_repo
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                role: input.role,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Authenticate by email + password and issue an access token.
    pub async fn login(&self, input: LoginInput) -> ClinicaResult<LoginOutput> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(user) => user,
            Err(ClinicaError::NotFound { .. }) => {
                password::burn_verification(&input.password);
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = token::issue_access_token(&user, &self.config)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutput {
            access_token,
            token_type: "bearer",
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Replace a user's password after verifying the current one.
    pub async fn rotate_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> ClinicaResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let valid = password::verify_password(
            current_password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }
        self.check_policy(new_password)?;

        let password_hash = password::hash_password(new_password, self.config.pepper.as_deref())?;
        self.user_repo.set_password_hash(user_id, password_hash).await?;

        info!(user_id = %user_id, "Password rotated");
        Ok(())
    }
}
