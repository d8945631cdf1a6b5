//! Admission (inpatient stay) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClinicaError, ClinicaResult};
use crate::validation::require_text;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admission {
    pub id: Uuid,
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "leito_id")]
    pub bed_id: Uuid,
    #[serde(rename = "data_entrada")]
    pub admitted_at: DateTime<Utc>,
    #[serde(rename = "data_alta")]
    pub discharged_at: Option<DateTime<Utc>>,
    #[serde(rename = "motivo")]
    pub reason: String,
}

impl Admission {
    /// An admission is open until it has a discharge time.
    pub fn is_open(&self) -> bool {
        self.discharged_at.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdmission {
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "leito_id")]
    pub bed_id: Uuid,
    #[serde(rename = "data_entrada")]
    pub admitted_at: DateTime<Utc>,
    #[serde(rename = "motivo")]
    pub reason: String,
}

impl CreateAdmission {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("motivo", &self.reason)
    }
}

/// Discharge request body (`PUT /internacoes/{id}/alta`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discharge {
    #[serde(rename = "data_alta")]
    pub discharged_at: DateTime<Utc>,
}

impl Discharge {
    pub fn validate_against(&self, admission: &Admission) -> ClinicaResult<()> {
        if self.discharged_at < admission.admitted_at {
            return Err(ClinicaError::validation(
                "data_alta anterior à data_entrada",
            ));
        }
        Ok(())
    }
}
