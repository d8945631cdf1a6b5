//! Professional domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClinicaResult;
use crate::validation::{require_email, require_text};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "especialidade")]
    pub specialty: String,
    /// Medical council registration number (CRM and similar).
    #[serde(rename = "registro_conselho")]
    pub council_registration: String,
    #[serde(rename = "criado_em")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfessional {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "especialidade")]
    pub specialty: String,
    #[serde(rename = "registro_conselho")]
    pub council_registration: String,
}

impl CreateProfessional {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("nome", &self.name)?;
        require_email(&self.email)?;
        require_text("especialidade", &self.specialty)?;
        require_text("registro_conselho", &self.council_registration)
    }
}
