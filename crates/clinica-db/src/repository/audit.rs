//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! The table rejects UPDATE and DELETE at the permission level; this
//! repository only ever appends and reads.

use chrono::{DateTime, Utc};
use clinica_core::error::ClinicaResult;
use clinica_core::models::audit::{AuditLogEntry, CreateAuditLogEntry};
use clinica_core::models::user::Role;
use clinica_core::repository::{AuditLogFilter, AuditLogRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AuditLogRow {
    record_id: String,
    actor_email: Option<String>,
    role: Option<String>,
    method: String,
    endpoint: String,
    description: String,
    timestamp: DateTime<Utc>,
}

impl AuditLogRow {
    fn try_into_entry(self) -> Result<AuditLogEntry, DbError> {
        let role: Option<Role> = self
            .role
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|_| DbError::Decode(format!("unknown role: {:?}", self.role)))?;
        Ok(AuditLogEntry {
            id: parse_uuid(&self.record_id, "audit_log")?,
            actor_email: self.actor_email,
            role,
            method: self.method,
            endpoint: self.endpoint,
            description: self.description,
            timestamp: self.timestamp,
        })
    }
}

/// SurrealDB implementation of the append-only audit log.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditLogEntry) -> ClinicaResult<AuditLogEntry> {
        let id_str = Uuid::new_v4().to_string();
        let actor_email = input.actor.email().map(str::to_string);
        let role = input.actor.role().map(|r| r.as_str().to_string());

        let mut result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 actor_email = $actor_email, role = $role, method = $method, \
                 endpoint = $endpoint, description = $description, \
                 timestamp = $timestamp; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('audit_log', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("actor_email", actor_email))
            .bind(("role", role))
            .bind(("method", input.method))
            .bind(("endpoint", input.endpoint))
            .bind(("description", input.description))
            .bind(("timestamp", input.timestamp))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        let rows: Vec<AuditLogRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "Registro de auditoria".into(),
            id: id_str,
        })?;

        Ok(row.try_into_entry()?)
    }

    async fn list(&self, filter: AuditLogFilter) -> ClinicaResult<Vec<AuditLogEntry>> {
        let mut conditions = Vec::new();
        if filter.actor_email.is_some() {
            conditions.push("actor_email = $actor_email");
        }
        if filter.endpoint.is_some() {
            conditions.push("endpoint = $endpoint");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM audit_log \
             {where_clause} ORDER BY timestamp DESC"
        );

        let mut builder = self.db.query(&query);
        if let Some(actor_email) = filter.actor_email {
            builder = builder.bind(("actor_email", actor_email));
        }
        if let Some(endpoint) = filter.endpoint {
            builder = builder.bind(("endpoint", endpoint));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<AuditLogRow> = result.take(0).map_err(DbError::from)?;
        let entries = rows
            .into_iter()
            .map(|r| r.try_into_entry())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
