//! SurrealDB implementation of [`ProfessionalRepository`].

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::professional::{CreateProfessional, Professional};
use clinica_core::repository::ProfessionalRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{on_conflict, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProfessionalRow {
    record_id: String,
    name: String,
    email: String,
    specialty: String,
    council_registration: String,
    created_at: DateTime<Utc>,
}

impl ProfessionalRow {
    fn try_into_professional(self) -> Result<Professional, DbError> {
        Ok(Professional {
            id: parse_uuid(&self.record_id, "professional")?,
            name: self.name,
            email: self.email,
            specialty: self.specialty,
            council_registration: self.council_registration,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Professional repository.
#[derive(Clone)]
pub struct SurrealProfessionalRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfessionalRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProfessionalRepository for SurrealProfessionalRepository<C> {
    async fn create(&self, input: CreateProfessional) -> ClinicaResult<Professional> {
        let id_str = Uuid::new_v4().to_string();

        let mut result = self
            .db
            .query(
                "CREATE type::record('professional', $id) SET \
                 name = $name, email = $email, specialty = $specialty, \
                 council_registration = $council_registration; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('professional', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("specialty", input.specialty))
            .bind(("council_registration", input.council_registration))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| {
                on_conflict(
                    DbError::from_statement(e),
                    "Profissional",
                    "Email ou registro de conselho já cadastrado",
                )
            })?;

        let rows: Vec<ProfessionalRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Profissional".into(),
            id: id_str,
        })?;

        Ok(row.try_into_professional()?)
    }

    async fn get_by_id(&self, id: Uuid) -> ClinicaResult<Professional> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('professional', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfessionalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Profissional".into(),
            id: id_str,
        })?;

        Ok(row.try_into_professional()?)
    }

    async fn first_by_specialty(&self, specialty: &str) -> ClinicaResult<Professional> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM professional \
                 WHERE specialty = $specialty ORDER BY created_at ASC LIMIT 1",
            )
            .bind(("specialty", specialty.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfessionalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Profissional".into(),
            id: format!("especialidade={specialty}"),
        })?;

        Ok(row.try_into_professional()?)
    }

    async fn list(&self) -> ClinicaResult<Vec<Professional>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM professional \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfessionalRow> = result.take(0).map_err(DbError::from)?;
        let professionals = rows
            .into_iter()
            .map(|r| r.try_into_professional())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(professionals)
    }
}
