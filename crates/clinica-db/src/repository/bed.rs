//! SurrealDB implementation of [`BedRepository`].

use clinica_core::error::ClinicaResult;
use clinica_core::models::bed::{Bed, CreateBed};
use clinica_core::repository::BedRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct BedRow {
    record_id: String,
    number: String,
    kind: String,
    unit: String,
    occupied: bool,
}

impl BedRow {
    fn try_into_bed(self) -> Result<Bed, DbError> {
        Ok(Bed {
            id: parse_uuid(&self.record_id, "bed")?,
            number: self.number,
            kind: self.kind,
            unit: self.unit,
            occupied: self.occupied,
        })
    }
}

/// SurrealDB implementation of the Bed repository.
#[derive(Clone)]
pub struct SurrealBedRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBedRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> BedRepository for SurrealBedRepository<C> {
    async fn create(&self, input: CreateBed) -> ClinicaResult<Bed> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('bed', $id) SET \
                 number = $number, kind = $kind, unit = $unit, occupied = false; \
                 SELECT meta::id(id) AS record_id, * FROM type::record('bed', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("number", input.number))
            .bind(("kind", input.kind))
            .bind(("unit", input.unit))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<BedRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Leito".into(),
            id: id_str,
        })?;

        Ok(row.try_into_bed()?)
    }

    async fn get_by_id(&self, id: Uuid) -> ClinicaResult<Bed> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('bed', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BedRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Leito".into(),
            id: id_str,
        })?;

        Ok(row.try_into_bed()?)
    }

    async fn list(&self) -> ClinicaResult<Vec<Bed>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM bed ORDER BY created_at ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BedRow> = result.take(0).map_err(DbError::from)?;
        let beds = rows
            .into_iter()
            .map(|r| r.try_into_bed())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(beds)
    }
}
