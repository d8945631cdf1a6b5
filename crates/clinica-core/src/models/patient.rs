//! Patient and clinical history domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClinicaResult;
use crate::validation::{require_email, require_text};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "data_nascimento")]
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatient {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "data_nascimento")]
    pub birth_date: NaiveDate,
}

impl CreatePatient {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("nome", &self.name)?;
        require_email(&self.email)?;
        require_text("telefone", &self.phone)
    }
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePatient {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "data_nascimento", default)]
    pub birth_date: Option<NaiveDate>,
}

impl UpdatePatient {
    pub fn validate(&self) -> ClinicaResult<()> {
        if let Some(name) = &self.name {
            require_text("nome", name)?;
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.birth_date.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatientFilter {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalHistoryEntry {
    pub id: Uuid,
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "data_registro")]
    pub recorded_at: DateTime<Utc>,
    #[serde(rename = "descricao")]
    pub description: String,
    /// Free-text name of the professional who wrote the entry.
    #[serde(rename = "profissional")]
    pub professional: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClinicalHistoryEntry {
    #[serde(rename = "data_registro")]
    pub recorded_at: DateTime<Utc>,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "profissional")]
    pub professional: String,
}

impl CreateClinicalHistoryEntry {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("descricao", &self.description)?;
        require_text("profissional", &self.professional)
    }
}
