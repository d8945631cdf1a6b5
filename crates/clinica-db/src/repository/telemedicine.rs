//! SurrealDB implementation of [`TelemedicineRepository`].

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::telemedicine::{CreateTelemedicineSession, TelemedicineSession};
use clinica_core::repository::{PatientRepository, ProfessionalRepository, TelemedicineRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{SurrealPatientRepository, SurrealProfessionalRepository, on_conflict, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct TelemedicineRow {
    record_id: String,
    patient_id: String,
    professional_id: String,
    scheduled_at: DateTime<Utc>,
    video_link: String,
    notes: Option<String>,
}

impl TelemedicineRow {
    fn try_into_session(self) -> Result<TelemedicineSession, DbError> {
        Ok(TelemedicineSession {
            id: parse_uuid(&self.record_id, "telemedicine")?,
            patient_id: parse_uuid(&self.patient_id, "patient")?,
            professional_id: parse_uuid(&self.professional_id, "professional")?,
            scheduled_at: self.scheduled_at,
            video_link: self.video_link,
            notes: self.notes,
        })
    }
}

/// SurrealDB implementation of the telemedicine repository.
#[derive(Clone)]
pub struct SurrealTelemedicineRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTelemedicineRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TelemedicineRepository for SurrealTelemedicineRepository<C> {
    async fn create(&self, input: CreateTelemedicineSession) -> ClinicaResult<TelemedicineSession> {
        SurrealProfessionalRepository::new(self.db.clone())
            .get_by_id(input.professional_id)
            .await?;
        SurrealPatientRepository::new(self.db.clone())
            .get_by_id(input.patient_id)
            .await?;

        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('telemedicine', $id) SET \
                 patient_id = $patient_id, professional_id = $professional_id, \
                 scheduled_at = $scheduled_at, video_link = $video_link, \
                 notes = $notes; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('telemedicine', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("patient_id", input.patient_id.to_string()))
            .bind(("professional_id", input.professional_id.to_string()))
            .bind(("scheduled_at", input.scheduled_at))
            .bind(("video_link", input.video_link.trim().to_string()))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| {
                on_conflict(
                    DbError::from_statement(e),
                    "Teleconsulta",
                    "Link de vídeo já utilizado",
                )
            })?;

        let rows: Vec<TelemedicineRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Teleconsulta".into(),
            id: id_str,
        })?;

        Ok(row.try_into_session()?)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> ClinicaResult<Vec<TelemedicineSession>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM telemedicine \
                 WHERE patient_id = $patient_id ORDER BY scheduled_at ASC",
            )
            .bind(("patient_id", patient_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TelemedicineRow> = result.take(0).map_err(DbError::from)?;
        let sessions = rows
            .into_iter()
            .map(|r| r.try_into_session())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sessions)
    }
}
