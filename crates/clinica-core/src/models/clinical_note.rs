//! Clinical progress note ("evolução clínica").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClinicaResult;
use crate::validation::require_text;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalNote {
    pub id: Uuid,
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "profissional_id")]
    pub professional_id: Uuid,
    #[serde(rename = "data_registro")]
    pub recorded_at: DateTime<Utc>,
    #[serde(rename = "anotacoes")]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClinicalNote {
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "data_registro")]
    pub recorded_at: DateTime<Utc>,
    #[serde(rename = "anotacoes")]
    pub notes: String,
}

impl CreateClinicalNote {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("anotacoes", &self.notes)
    }
}
