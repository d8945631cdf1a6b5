//! SurrealDB implementation of [`SupplyRepository`].

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::supply::{CreateSupply, Supply};
use clinica_core::repository::SupplyRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SupplyRow {
    record_id: String,
    name: String,
    category: String,
    quantity: u32,
    expires_at: Option<DateTime<Utc>>,
}

impl SupplyRow {
    fn try_into_supply(self) -> Result<Supply, DbError> {
        Ok(Supply {
            id: parse_uuid(&self.record_id, "supply")?,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            expires_at: self.expires_at,
        })
    }
}

/// SurrealDB implementation of the Supply repository.
#[derive(Clone)]
pub struct SurrealSupplyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSupplyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SupplyRepository for SurrealSupplyRepository<C> {
    async fn create(&self, input: CreateSupply) -> ClinicaResult<Supply> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('supply', $id) SET \
                 name = $name, category = $category, quantity = $quantity, \
                 expires_at = $expires_at; \
                 SELECT meta::id(id) AS record_id, * FROM type::record('supply', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("category", input.category))
            .bind(("quantity", input.quantity))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<SupplyRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Suprimento".into(),
            id: id_str,
        })?;

        Ok(row.try_into_supply()?)
    }

    async fn list(&self) -> ClinicaResult<Vec<Supply>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM supply ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SupplyRow> = result.take(0).map_err(DbError::from)?;
        let supplies = rows
            .into_iter()
            .map(|r| r.try_into_supply())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(supplies)
    }
}
