//! Audit log writer.
//!
//! Each record goes to the `audit_log` table and to the `audit` tracing
//! target, which the server routes into its rotating log file. Storage
//! failures are logged and swallowed; auditing never fails a request.

use chrono::Utc;
use clinica_core::models::audit::{Actor, CreateAuditLogEntry};
use clinica_core::repository::AuditLogRepository;
use tracing::{info, warn};

/// Appends audit records through an [`AuditLogRepository`].
#[derive(Clone)]
pub struct AuditWriter<A: AuditLogRepository> {
    repo: A,
}

impl<A: AuditLogRepository> AuditWriter<A> {
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    /// Record one audited action.
    pub async fn record(
        &self,
        actor: Actor,
        method: &str,
        endpoint: &str,
        description: impl Into<String>,
    ) {
        let description = description.into();

        info!(
            target: "audit",
            actor = actor.email().unwrap_or("anonimo"),
            role = actor.role().map(|r| r.as_str()).unwrap_or("-"),
            method,
            endpoint,
            "{description}"
        );

        let entry = CreateAuditLogEntry {
            actor,
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            description,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.repo.append(entry).await {
            warn!(error = %e, endpoint, "Failed to persist audit log entry");
        }
    }

    /// Access to the underlying repository for read-side queries.
    pub fn repository(&self) -> &A {
        &self.repo
    }
}
