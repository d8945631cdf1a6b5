//! Telemedicine consultation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClinicaError, ClinicaResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemedicineSession {
    pub id: Uuid,
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "profissional_id")]
    pub professional_id: Uuid,
    #[serde(rename = "data_hora")]
    pub scheduled_at: DateTime<Utc>,
    /// Unique across all sessions.
    #[serde(rename = "link_video")]
    pub video_link: String,
    #[serde(rename = "observacoes")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTelemedicineSession {
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "profissional_id")]
    pub professional_id: Uuid,
    #[serde(rename = "data_hora")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(rename = "link_video")]
    pub video_link: String,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
}

impl CreateTelemedicineSession {
    pub fn validate(&self) -> ClinicaResult<()> {
        let link = self.video_link.trim();
        if !(link.starts_with("https://") || link.starts_with("http://")) {
            return Err(ClinicaError::validation(format!(
                "link_video deve ser uma URL http(s): {link}"
            )));
        }
        Ok(())
    }
}
