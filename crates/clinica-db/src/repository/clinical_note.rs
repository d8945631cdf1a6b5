//! SurrealDB implementation of [`ClinicalNoteRepository`].

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::clinical_note::{ClinicalNote, CreateClinicalNote};
use clinica_core::repository::{ClinicalNoteRepository, PatientRepository, ProfessionalRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{SurrealPatientRepository, SurrealProfessionalRepository, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ClinicalNoteRow {
    record_id: String,
    patient_id: String,
    professional_id: String,
    recorded_at: DateTime<Utc>,
    notes: String,
}

impl ClinicalNoteRow {
    fn try_into_note(self) -> Result<ClinicalNote, DbError> {
        Ok(ClinicalNote {
            id: parse_uuid(&self.record_id, "clinical_note")?,
            patient_id: parse_uuid(&self.patient_id, "patient")?,
            professional_id: parse_uuid(&self.professional_id, "professional")?,
            recorded_at: self.recorded_at,
            notes: self.notes,
        })
    }
}

/// SurrealDB implementation of the clinical note repository.
#[derive(Clone)]
pub struct SurrealClinicalNoteRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealClinicalNoteRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ClinicalNoteRepository for SurrealClinicalNoteRepository<C> {
    async fn create(
        &self,
        professional_id: Uuid,
        input: CreateClinicalNote,
    ) -> ClinicaResult<ClinicalNote> {
        SurrealProfessionalRepository::new(self.db.clone())
            .get_by_id(professional_id)
            .await?;
        SurrealPatientRepository::new(self.db.clone())
            .get_by_id(input.patient_id)
            .await?;

        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('clinical_note', $id) SET \
                 patient_id = $patient_id, professional_id = $professional_id, \
                 recorded_at = $recorded_at, notes = $notes; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('clinical_note', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("patient_id", input.patient_id.to_string()))
            .bind(("professional_id", professional_id.to_string()))
            .bind(("recorded_at", input.recorded_at))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<ClinicalNoteRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Registro de evolução".into(),
            id: id_str,
        })?;

        Ok(row.try_into_note()?)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> ClinicaResult<Vec<ClinicalNote>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM clinical_note \
                 WHERE patient_id = $patient_id ORDER BY recorded_at DESC",
            )
            .bind(("patient_id", patient_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClinicalNoteRow> = result.take(0).map_err(DbError::from)?;
        let notes = rows
            .into_iter()
            .map(|r| r.try_into_note())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }
}
