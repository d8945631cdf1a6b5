//! SurrealDB implementation of [`PrescriptionRepository`].

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::prescription::{CreatePrescription, Prescription};
use clinica_core::repository::{PatientRepository, PrescriptionRepository, ProfessionalRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{SurrealPatientRepository, SurrealProfessionalRepository, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PrescriptionRow {
    record_id: String,
    patient_id: String,
    professional_id: String,
    prescribed_at: DateTime<Utc>,
    medication: String,
    dosage: String,
}

impl PrescriptionRow {
    fn try_into_prescription(self) -> Result<Prescription, DbError> {
        Ok(Prescription {
            id: parse_uuid(&self.record_id, "prescription")?,
            patient_id: parse_uuid(&self.patient_id, "patient")?,
            professional_id: parse_uuid(&self.professional_id, "professional")?,
            prescribed_at: self.prescribed_at,
            medication: self.medication,
            dosage: self.dosage,
        })
    }
}

/// SurrealDB implementation of the Prescription repository.
#[derive(Clone)]
pub struct SurrealPrescriptionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPrescriptionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(&self, column: &str, value: Uuid) -> ClinicaResult<Vec<Prescription>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM prescription \
             WHERE {column} = $value ORDER BY prescribed_at DESC"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrescriptionRow> = result.take(0).map_err(DbError::from)?;
        let prescriptions = rows
            .into_iter()
            .map(|r| r.try_into_prescription())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(prescriptions)
    }
}

impl<C: Connection> PrescriptionRepository for SurrealPrescriptionRepository<C> {
    async fn create(
        &self,
        professional_id: Uuid,
        input: CreatePrescription,
    ) -> ClinicaResult<Prescription> {
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
                "CREATE type::record('prescription', $id) SET \
                 patient_id = $patient_id, professional_id = $professional_id, \
                 prescribed_at = $prescribed_at, medication = $medication, \
                 dosage = $dosage; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('prescription', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("patient_id", input.patient_id.to_string()))
            .bind(("professional_id", professional_id.to_string()))
            .bind(("prescribed_at", input.prescribed_at))
            .bind(("medication", input.medication))
            .bind(("dosage", input.dosage))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<PrescriptionRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Prescrição".into(),
            id: id_str,
        })?;

        Ok(row.try_into_prescription()?)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> ClinicaResult<Vec<Prescription>> {
        self.list_where("patient_id", patient_id).await
    }

    async fn list_by_professional(&self, professional_id: Uuid) -> ClinicaResult<Vec<Prescription>> {
        self.list_where("professional_id", professional_id).await
    }
}
