//! SurrealDB implementation of [`ScheduleRepository`].
//!
//! Slots are only created here. Their `available` flag is owned by the
//! allocation ledger.

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::schedule::{CreateScheduleSlot, ScheduleSlot};
use clinica_core::repository::{ProfessionalRepository, ScheduleRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{SurrealProfessionalRepository, on_conflict, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SlotRow {
    record_id: String,
    professional_id: String,
    starts_at: DateTime<Utc>,
    available: bool,
}

impl SlotRow {
    fn try_into_slot(self) -> Result<ScheduleSlot, DbError> {
        Ok(ScheduleSlot {
            id: parse_uuid(&self.record_id, "schedule_slot")?,
            professional_id: parse_uuid(&self.professional_id, "professional")?,
            starts_at: self.starts_at,
            available: self.available,
        })
    }
}

/// SurrealDB implementation of the schedule repository.
#[derive(Clone)]
pub struct SurrealScheduleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealScheduleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScheduleRepository for SurrealScheduleRepository<C> {
    async fn create(
        &self,
        professional_id: Uuid,
        input: CreateScheduleSlot,
    ) -> ClinicaResult<ScheduleSlot> {
        SurrealProfessionalRepository::new(self.db.clone())
            .get_by_id(professional_id)
            .await?;

        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('schedule_slot', $id) SET \
                 professional_id = $professional_id, starts_at = $starts_at, \
                 available = true; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('schedule_slot', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("professional_id", professional_id.to_string()))
            .bind(("starts_at", input.starts_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| on_conflict(DbError::from_statement(e), "Horário", "Horário já existe"))?;

        let rows: Vec<SlotRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Horário".into(),
            id: id_str,
        })?;

        Ok(row.try_into_slot()?)
    }

    async fn get_by_id(&self, id: Uuid) -> ClinicaResult<ScheduleSlot> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('schedule_slot', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SlotRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Horário".into(),
            id: id_str,
        })?;

        Ok(row.try_into_slot()?)
    }

    async fn find(
        &self,
        professional_id: Uuid,
        starts_at: DateTime<Utc>,
    ) -> ClinicaResult<Option<ScheduleSlot>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM schedule_slot \
                 WHERE professional_id = $professional_id AND starts_at = $starts_at",
            )
            .bind(("professional_id", professional_id.to_string()))
            .bind(("starts_at", starts_at))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SlotRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_slot()?)),
            None => Ok(None),
        }
    }

    async fn list_by_professional(&self, professional_id: Uuid) -> ClinicaResult<Vec<ScheduleSlot>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM schedule_slot \
                 WHERE professional_id = $professional_id ORDER BY starts_at ASC",
            )
            .bind(("professional_id", professional_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SlotRow> = result.take(0).map_err(DbError::from)?;
        let slots = rows
            .into_iter()
            .map(|r| r.try_into_slot())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(slots)
    }
}
