//! SurrealDB implementation of [`AdmissionRepository`] (read side).
//!
//! Admissions are opened and closed only by the allocation ledger.

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::admission::Admission;
use clinica_core::repository::AdmissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AdmissionRow {
    record_id: String,
    patient_id: String,
    bed_id: String,
    admitted_at: DateTime<Utc>,
    discharged_at: Option<DateTime<Utc>>,
    reason: String,
}

impl AdmissionRow {
    fn try_into_admission(self) -> Result<Admission, DbError> {
        Ok(Admission {
            id: parse_uuid(&self.record_id, "admission")?,
            patient_id: parse_uuid(&self.patient_id, "patient")?,
            bed_id: parse_uuid(&self.bed_id, "bed")?,
            admitted_at: self.admitted_at,
            discharged_at: self.discharged_at,
            reason: self.reason,
        })
    }
}

/// SurrealDB implementation of the Admission repository.
#[derive(Clone)]
pub struct SurrealAdmissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAdmissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select(&self, query: &str, bed_id: Option<Uuid>) -> ClinicaResult<Vec<Admission>> {
        let mut builder = self.db.query(query);
        if let Some(bed_id) = bed_id {
            builder = builder.bind(("bed_id", bed_id.to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<AdmissionRow> = result.take(0).map_err(DbError::from)?;
        let admissions = rows
            .into_iter()
            .map(|r| r.try_into_admission())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(admissions)
    }
}

impl<C: Connection> AdmissionRepository for SurrealAdmissionRepository<C> {
    async fn get_by_id(&self, id: Uuid) -> ClinicaResult<Admission> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('admission', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdmissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Registro de internação".into(),
            id: id_str,
        })?;

        Ok(row.try_into_admission()?)
    }

    async fn list(&self) -> ClinicaResult<Vec<Admission>> {
        self.select(
            "SELECT meta::id(id) AS record_id, * FROM admission ORDER BY admitted_at DESC",
            None,
        )
        .await
    }

    async fn list_open_for_bed(&self, bed_id: Uuid) -> ClinicaResult<Vec<Admission>> {
        self.select(
            "SELECT meta::id(id) AS record_id, * FROM admission \
             WHERE bed_id = $bed_id AND discharged_at = NONE",
            Some(bed_id),
        )
        .await
    }
}
