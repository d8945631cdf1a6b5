//! Identity domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClinicaError, ClinicaResult};
use crate::validation::{require_email, require_text};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "Administrador")]
    Admin,
    #[serde(rename = "Profissional")]
    Professional,
    #[serde(rename = "Paciente")]
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Professional => "Profissional",
            Role::Patient => "Paciente",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClinicaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Administrador" => Ok(Role::Admin),
            "Profissional" => Ok(Role::Professional),
            "Paciente" => Ok(Role::Patient),
            other => Err(ClinicaError::validation(format!("perfil desconhecido: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(rename = "perfil")]
    pub role: Role,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

/// Registration payload (`POST /usuarios`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    #[serde(rename = "senha")]
    pub password: String,
    #[serde(rename = "perfil")]
    pub role: Role,
}

impl CreateUser {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("nome", &self.name)?;
        require_email(&self.email)
    }
}

/// Row-level input for the user repository; the credential is already
/// hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_wire_name() {
        for role in [Role::Admin, Role::Professional, Role::Patient] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["perfil"], "Administrador");
    }
}
