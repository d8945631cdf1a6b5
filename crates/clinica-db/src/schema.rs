//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (identities that can log in)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['Administrador', 'Profissional', 'Paciente'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Patients and clinical history
-- =======================================================================
DEFINE TABLE patient SCHEMAFULL;
DEFINE FIELD name ON TABLE patient TYPE string;
DEFINE FIELD email ON TABLE patient TYPE string;
DEFINE FIELD phone ON TABLE patient TYPE string;
DEFINE FIELD birth_date ON TABLE patient TYPE string;
DEFINE FIELD created_at ON TABLE patient TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_patient_email ON TABLE patient COLUMNS email UNIQUE;

DEFINE TABLE clinical_history SCHEMAFULL;
DEFINE FIELD patient_id ON TABLE clinical_history TYPE string;
DEFINE FIELD recorded_at ON TABLE clinical_history TYPE datetime;
DEFINE FIELD description ON TABLE clinical_history TYPE string;
DEFINE FIELD professional ON TABLE clinical_history TYPE string;
DEFINE INDEX idx_history_patient ON TABLE clinical_history \
    COLUMNS patient_id;

-- =======================================================================
-- Professionals and schedule slots
-- =======================================================================
DEFINE TABLE professional SCHEMAFULL;
DEFINE FIELD name ON TABLE professional TYPE string;
DEFINE FIELD email ON TABLE professional TYPE string;
DEFINE FIELD specialty ON TABLE professional TYPE string;
DEFINE FIELD council_registration ON TABLE professional TYPE string;
DEFINE FIELD created_at ON TABLE professional TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_professional_email ON TABLE professional \
    COLUMNS email UNIQUE;
DEFINE INDEX idx_professional_council ON TABLE professional \
    COLUMNS council_registration UNIQUE;
DEFINE INDEX idx_professional_specialty ON TABLE professional \
    COLUMNS specialty;

DEFINE TABLE schedule_slot SCHEMAFULL;
DEFINE FIELD professional_id ON TABLE schedule_slot TYPE string;
DEFINE FIELD starts_at ON TABLE schedule_slot TYPE datetime;
DEFINE FIELD available ON TABLE schedule_slot TYPE bool DEFAULT true;
DEFINE INDEX idx_slot_professional_time ON TABLE schedule_slot \
    COLUMNS professional_id, starts_at UNIQUE;

-- =======================================================================
-- Appointments. A scheduled appointment holds its slot through a
-- slot_claim row whose record id is the slot id, so a second claim on
-- the same slot collides on the primary key.
-- =======================================================================
DEFINE TABLE appointment SCHEMAFULL;
DEFINE FIELD patient_id ON TABLE appointment TYPE string;
DEFINE FIELD professional_id ON TABLE appointment TYPE string;
DEFINE FIELD slot_id ON TABLE appointment TYPE string;
DEFINE FIELD scheduled_for ON TABLE appointment TYPE datetime;
DEFINE FIELD specialty ON TABLE appointment TYPE string;
DEFINE FIELD status ON TABLE appointment TYPE string \
    ASSERT $value IN ['Agendada', 'Realizada', 'Cancelada'];
DEFINE FIELD created_at ON TABLE appointment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_appointment_patient ON TABLE appointment \
    COLUMNS patient_id;

DEFINE TABLE slot_claim SCHEMAFULL;
DEFINE FIELD slot_id ON TABLE slot_claim TYPE string;
DEFINE FIELD appointment_id ON TABLE slot_claim TYPE string;
DEFINE FIELD patient_id ON TABLE slot_claim TYPE string;
DEFINE FIELD claimed_at ON TABLE slot_claim TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_slot_claim_slot ON TABLE slot_claim \
    COLUMNS slot_id UNIQUE;

-- =======================================================================
-- Beds and admissions, guarded by bed_claim the same way.
-- =======================================================================
DEFINE TABLE bed SCHEMAFULL;
DEFINE FIELD number ON TABLE bed TYPE string;
DEFINE FIELD kind ON TABLE bed TYPE string;
DEFINE FIELD unit ON TABLE bed TYPE string;
DEFINE FIELD occupied ON TABLE bed TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE bed TYPE datetime DEFAULT time::now();

DEFINE TABLE admission SCHEMAFULL;
DEFINE FIELD patient_id ON TABLE admission TYPE string;
DEFINE FIELD bed_id ON TABLE admission TYPE string;
DEFINE FIELD admitted_at ON TABLE admission TYPE datetime;
DEFINE FIELD discharged_at ON TABLE admission TYPE option<datetime>;
DEFINE FIELD reason ON TABLE admission TYPE string;
DEFINE INDEX idx_admission_patient ON TABLE admission \
    COLUMNS patient_id;
DEFINE INDEX idx_admission_bed ON TABLE admission COLUMNS bed_id;

DEFINE TABLE bed_claim SCHEMAFULL;
DEFINE FIELD bed_id ON TABLE bed_claim TYPE string;
DEFINE FIELD admission_id ON TABLE bed_claim TYPE string;
DEFINE FIELD patient_id ON TABLE bed_claim TYPE string;
DEFINE FIELD claimed_at ON TABLE bed_claim TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_bed_claim_bed ON TABLE bed_claim \
    COLUMNS bed_id UNIQUE;

-- =======================================================================
-- Clinical records
-- =======================================================================
DEFINE TABLE prescription SCHEMAFULL;
DEFINE FIELD patient_id ON TABLE prescription TYPE string;
DEFINE FIELD professional_id ON TABLE prescription TYPE string;
DEFINE FIELD prescribed_at ON TABLE prescription TYPE datetime;
DEFINE FIELD medication ON TABLE prescription TYPE string;
DEFINE FIELD dosage ON TABLE prescription TYPE string;
DEFINE INDEX idx_prescription_patient ON TABLE prescription \
    COLUMNS patient_id;
DEFINE INDEX idx_prescription_professional ON TABLE prescription \
    COLUMNS professional_id;

DEFINE TABLE clinical_note SCHEMAFULL;
DEFINE FIELD patient_id ON TABLE clinical_note TYPE string;
DEFINE FIELD professional_id ON TABLE clinical_note TYPE string;
DEFINE FIELD recorded_at ON TABLE clinical_note TYPE datetime;
DEFINE FIELD notes ON TABLE clinical_note TYPE string;
DEFINE INDEX idx_note_patient ON TABLE clinical_note COLUMNS patient_id;

DEFINE TABLE telemedicine SCHEMAFULL;
DEFINE FIELD patient_id ON TABLE telemedicine TYPE string;
DEFINE FIELD professional_id ON TABLE telemedicine TYPE string;
DEFINE FIELD scheduled_at ON TABLE telemedicine TYPE datetime;
DEFINE FIELD video_link ON TABLE telemedicine TYPE string;
DEFINE FIELD notes ON TABLE telemedicine TYPE option<string>;
DEFINE INDEX idx_telemedicine_link ON TABLE telemedicine \
    COLUMNS video_link UNIQUE;
DEFINE INDEX idx_telemedicine_patient ON TABLE telemedicine \
    COLUMNS patient_id;

-- =======================================================================
-- Hospital administration
-- =======================================================================
DEFINE TABLE supply SCHEMAFULL;
DEFINE FIELD name ON TABLE supply TYPE string;
DEFINE FIELD category ON TABLE supply TYPE string;
DEFINE FIELD quantity ON TABLE supply TYPE int ASSERT $value >= 0;
DEFINE FIELD expires_at ON TABLE supply TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE supply TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE financial_entry SCHEMAFULL;
DEFINE FIELD kind ON TABLE financial_entry TYPE string;
DEFINE FIELD category ON TABLE financial_entry TYPE string;
DEFINE FIELD amount ON TABLE financial_entry TYPE float;
DEFINE FIELD entry_date ON TABLE financial_entry TYPE datetime;
DEFINE FIELD unit ON TABLE financial_entry TYPE option<string>;
DEFINE FIELD description ON TABLE financial_entry TYPE option<string>;
DEFINE INDEX idx_financial_entry_date ON TABLE financial_entry \
    COLUMNS entry_date;

-- =======================================================================
-- Audit Log (append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD actor_email ON TABLE audit_log TYPE option<string>;
DEFINE FIELD role ON TABLE audit_log TYPE option<string>;
DEFINE FIELD method ON TABLE audit_log TYPE string;
DEFINE FIELD endpoint ON TABLE audit_log TYPE string;
DEFINE FIELD description ON TABLE audit_log TYPE string;
DEFINE FIELD timestamp ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_time ON TABLE audit_log COLUMNS timestamp;
DEFINE INDEX idx_audit_actor ON TABLE audit_log COLUMNS actor_email;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn allocation_claims_are_unique_per_resource() {
        assert!(SCHEMA_V1.contains("COLUMNS slot_id UNIQUE"));
        assert!(SCHEMA_V1.contains("COLUMNS bed_id UNIQUE"));
        assert!(SCHEMA_V1.contains("COLUMNS professional_id, starts_at UNIQUE"));
    }

    #[test]
    fn audit_log_rejects_updates_and_deletes() {
        let audit = &SCHEMA_V1[SCHEMA_V1.find("DEFINE TABLE audit_log").unwrap()..];
        assert!(audit.contains("FOR update NONE"));
        assert!(audit.contains("FOR delete NONE"));
    }
}
