//! SurrealDB implementation of [`AppointmentRepository`] (read side).
//!
//! Appointments are written only by the allocation ledger.

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::appointment::{Appointment, AppointmentStatus};
use clinica_core::repository::AppointmentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AppointmentRow {
    record_id: String,
    patient_id: String,
    professional_id: String,
    slot_id: String,
    scheduled_for: DateTime<Utc>,
    specialty: String,
    status: String,
}

impl AppointmentRow {
    fn try_into_appointment(self) -> Result<Appointment, DbError> {
        let status = AppointmentStatus::parse(&self.status)
            .ok_or_else(|| DbError::Decode(format!("unknown appointment status: {}", self.status)))?;
        Ok(Appointment {
            id: parse_uuid(&self.record_id, "appointment")?,
            patient_id: parse_uuid(&self.patient_id, "patient")?,
            professional_id: parse_uuid(&self.professional_id, "professional")?,
            slot_id: parse_uuid(&self.slot_id, "schedule_slot")?,
            scheduled_for: self.scheduled_for,
            specialty: self.specialty,
            status,
        })
    }
}

/// SurrealDB implementation of the Appointment repository.
#[derive(Clone)]
pub struct SurrealAppointmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAppointmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AppointmentRepository for SurrealAppointmentRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> ClinicaResult<Appointment> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('appointment', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppointmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Agendamento".into(),
            id: id_str,
        })?;

        Ok(row.try_into_appointment()?)
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> ClinicaResult<Vec<Appointment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM appointment \
                 WHERE patient_id = $patient_id ORDER BY scheduled_for ASC",
            )
            .bind(("patient_id", patient_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppointmentRow> = result.take(0).map_err(DbError::from)?;
        let appointments = rows
            .into_iter()
            .map(|r| r.try_into_appointment())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(appointments)
    }
}
