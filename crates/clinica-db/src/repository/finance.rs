//! SurrealDB implementation of [`FinancialEntryRepository`].

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::finance::{CreateFinancialEntry, FinancialEntry};
use clinica_core::repository::FinancialEntryRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct FinancialEntryRow {
    record_id: String,
    kind: String,
    category: String,
    amount: f64,
    entry_date: DateTime<Utc>,
    unit: Option<String>,
    description: Option<String>,
}

impl FinancialEntryRow {
    fn try_into_entry(self) -> Result<FinancialEntry, DbError> {
        Ok(FinancialEntry {
            id: parse_uuid(&self.record_id, "financial_entry")?,
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            entry_date: self.entry_date,
            unit: self.unit,
            description: self.description,
        })
    }
}

fn into_entries(rows: Vec<FinancialEntryRow>) -> Result<Vec<FinancialEntry>, DbError> {
    rows.into_iter().map(|r| r.try_into_entry()).collect()
}

/// SurrealDB implementation of the financial entry repository.
#[derive(Clone)]
pub struct SurrealFinancialEntryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealFinancialEntryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> FinancialEntryRepository for SurrealFinancialEntryRepository<C> {
    async fn create(&self, input: CreateFinancialEntry) -> ClinicaResult<FinancialEntry> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('financial_entry', $id) SET \
                 kind = $kind, category = $category, amount = $amount, \
                 entry_date = $entry_date, unit = $unit, \
                 description = $description; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('financial_entry', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("kind", input.kind))
            .bind(("category", input.category))
            .bind(("amount", input.amount))
            .bind(("entry_date", input.entry_date))
            .bind(("unit", input.unit))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<FinancialEntryRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Lançamento".into(),
            id: id_str,
        })?;

        Ok(row.try_into_entry()?)
    }

    async fn list(&self) -> ClinicaResult<Vec<FinancialEntry>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM financial_entry \
                 ORDER BY entry_date DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FinancialEntryRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_entries(rows)?)
    }

    async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ClinicaResult<Vec<FinancialEntry>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM financial_entry \
                 WHERE entry_date >= $from AND entry_date <= $to \
                 ORDER BY entry_date ASC",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FinancialEntryRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_entries(rows)?)
    }
}
