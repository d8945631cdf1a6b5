//! Prescription domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClinicaResult;
use crate::validation::require_text;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "profissional_id")]
    pub professional_id: Uuid,
    #[serde(rename = "data_prescricao")]
    pub prescribed_at: DateTime<Utc>,
    #[serde(rename = "medicamento")]
    pub medication: String,
    #[serde(rename = "posologia")]
    pub dosage: String,
}

/// Prescription body; the prescribing professional comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrescription {
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "data_prescricao")]
    pub prescribed_at: DateTime<Utc>,
    #[serde(rename = "medicamento")]
    pub medication: String,
    #[serde(rename = "posologia")]
    pub dosage: String,
}

impl CreatePrescription {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("medicamento", &self.medication)?;
        require_text("posologia", &self.dosage)
    }
}
