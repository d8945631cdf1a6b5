//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Role;

/// Who performed an audited action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Identified { email: String, role: Role },
}

impl Actor {
    pub fn email(&self) -> Option<&str> {
        match self {
            Actor::Anonymous => None,
            Actor::Identified { email, .. } => Some(email),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Actor::Anonymous => None,
            Actor::Identified { role, .. } => Some(*role),
        }
    }
}

/// Append-only record of a sensitive action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    #[serde(rename = "usuario_email")]
    pub actor_email: Option<String>,
    #[serde(rename = "perfil")]
    pub role: Option<Role>,
    #[serde(rename = "metodo")]
    pub method: String,
    pub endpoint: String,
    #[serde(rename = "descricao")]
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAuditLogEntry {
    pub actor: Actor,
    pub method: String,
    pub endpoint: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}
