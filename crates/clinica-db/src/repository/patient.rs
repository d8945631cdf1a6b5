//! SurrealDB implementations of [`PatientRepository`] and
//! [`ClinicalHistoryRepository`].
//!
//! Birth dates are stored as ISO-8601 calendar strings (`YYYY-MM-DD`).

use chrono::{DateTime, NaiveDate, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::patient::{
    ClinicalHistoryEntry, CreateClinicalHistoryEntry, CreatePatient, Patient, PatientFilter,
    UpdatePatient,
};
use clinica_core::repository::{ClinicalHistoryRepository, PatientRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{on_conflict, parse_uuid};
use crate::error::DbError;

const DUPLICATE_EMAIL: &str = "Email já cadastrado";

/// Deletes a patient and everything that references it. Slots held by
/// scheduled appointments and beds held by open admissions are released
/// before their claim rows go.
const DELETE_PATIENT_CASCADE: &str = "\
BEGIN TRANSACTION;
UPDATE schedule_slot SET available = true WHERE meta::id(id) IN \
    (SELECT VALUE slot_id FROM appointment WHERE patient_id = $id AND status = 'Agendada');
DELETE slot_claim WHERE patient_id = $id;
UPDATE bed SET occupied = false WHERE meta::id(id) IN \
    (SELECT VALUE bed_id FROM admission WHERE patient_id = $id AND discharged_at = NONE);
DELETE bed_claim WHERE patient_id = $id;
DELETE clinical_history WHERE patient_id = $id;
DELETE clinical_note WHERE patient_id = $id;
DELETE prescription WHERE patient_id = $id;
DELETE telemedicine WHERE patient_id = $id;
DELETE admission WHERE patient_id = $id;
DELETE appointment WHERE patient_id = $id;
DELETE type::record('patient', $id);
COMMIT TRANSACTION;
";

#[derive(Debug, SurrealValue)]
struct PatientRow {
    record_id: String,
    name: String,
    email: String,
    phone: String,
    birth_date: String,
}

impl PatientRow {
    fn try_into_patient(self) -> Result<Patient, DbError> {
        let birth_date = NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d")
            .map_err(|e| DbError::Decode(format!("invalid birth_date: {e}")))?;
        Ok(Patient {
            id: parse_uuid(&self.record_id, "patient")?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            birth_date,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct HistoryRow {
    record_id: String,
    patient_id: String,
    recorded_at: DateTime<Utc>,
    description: String,
    professional: String,
}

impl HistoryRow {
    fn try_into_entry(self) -> Result<ClinicalHistoryEntry, DbError> {
        Ok(ClinicalHistoryEntry {
            id: parse_uuid(&self.record_id, "clinical_history")?,
            patient_id: parse_uuid(&self.patient_id, "patient")?,
            recorded_at: self.recorded_at,
            description: self.description,
            professional: self.professional,
        })
    }
}

fn format_birth_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// SurrealDB implementation of the Patient repository.
#[derive(Clone)]
pub struct SurrealPatientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPatientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PatientRepository for SurrealPatientRepository<C> {
    async fn create(&self, input: CreatePatient) -> ClinicaResult<Patient> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('patient', $id) SET \
                 name = $name, email = $email, phone = $phone, \
                 birth_date = $birth_date; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('patient', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("birth_date", format_birth_date(input.birth_date)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| on_conflict(DbError::from_statement(e), "Paciente", DUPLICATE_EMAIL))?;

        let rows: Vec<PatientRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Paciente".into(),
            id: id_str,
        })?;

        Ok(row.try_into_patient()?)
    }

    async fn get_by_id(&self, id: Uuid) -> ClinicaResult<Patient> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('patient', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Paciente".into(),
            id: id_str,
        })?;

        Ok(row.try_into_patient()?)
    }

    async fn list(&self, filter: PatientFilter) -> ClinicaResult<Vec<Patient>> {
        let mut result = match filter.email {
            Some(email) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM patient \
                     WHERE email = $email ORDER BY created_at ASC",
                )
                .bind(("email", email)),
            None => self.db.query(
                "SELECT meta::id(id) AS record_id, * FROM patient \
                 ORDER BY created_at ASC",
            ),
        }
        .await
        .map_err(DbError::from)?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let patients = rows
            .into_iter()
            .map(|r| r.try_into_patient())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(patients)
    }

    async fn update(&self, id: Uuid, input: UpdatePatient) -> ClinicaResult<Patient> {
        let current = self.get_by_id(id).await?;
        if input.is_empty() {
            return Ok(current);
        }

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.birth_date.is_some() {
            sets.push("birth_date = $birth_date");
        }

        let query = format!(
            "UPDATE type::record('patient', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * FROM type::record('patient', $id);",
            sets.join(", ")
        );

        let id_str = id.to_string();
        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(birth_date) = input.birth_date {
            builder = builder.bind(("birth_date", format_birth_date(birth_date)));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| on_conflict(DbError::from_statement(e), "Paciente", DUPLICATE_EMAIL))?;

        let rows: Vec<PatientRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Paciente".into(),
            id: id_str,
        })?;

        Ok(row.try_into_patient()?)
    }

    async fn delete(&self, id: Uuid) -> ClinicaResult<()> {
        self.get_by_id(id).await?;

        self.db
            .query(DELETE_PATIENT_CASCADE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        info!(patient_id = %id, "Patient deleted with dependent records");
        Ok(())
    }
}

/// SurrealDB implementation of the clinical history repository.
#[derive(Clone)]
pub struct SurrealClinicalHistoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealClinicalHistoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ClinicalHistoryRepository for SurrealClinicalHistoryRepository<C> {
    async fn create(
        &self,
        patient_id: Uuid,
        input: CreateClinicalHistoryEntry,
    ) -> ClinicaResult<ClinicalHistoryEntry> {
        SurrealPatientRepository::new(self.db.clone())
            .get_by_id(patient_id)
            .await?;

        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('clinical_history', $id) SET \
                 patient_id = $patient_id, recorded_at = $recorded_at, \
                 description = $description, professional = $professional; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('clinical_history', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("patient_id", patient_id.to_string()))
            .bind(("recorded_at", input.recorded_at))
            .bind(("description", input.description))
            .bind(("professional", input.professional))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<HistoryRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Histórico".into(),
            id: id_str,
        })?;

        Ok(row.try_into_entry()?)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> ClinicaResult<Vec<ClinicalHistoryEntry>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM clinical_history \
                 WHERE patient_id = $patient_id ORDER BY recorded_at ASC",
            )
            .bind(("patient_id", patient_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HistoryRow> = result.take(0).map_err(DbError::from)?;
        let entries = rows
            .into_iter()
            .map(|r| r.try_into_entry())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
