//! SurrealDB repository implementations.

mod admission;
mod appointment;
mod audit;
mod bed;
mod clinical_note;
mod finance;
mod patient;
mod prescription;
mod professional;
mod schedule;
mod supply;
mod telemedicine;
mod user;

pub use admission::SurrealAdmissionRepository;
pub use appointment::SurrealAppointmentRepository;
pub use audit::SurrealAuditLogRepository;
pub use bed::SurrealBedRepository;
pub use clinical_note::SurrealClinicalNoteRepository;
pub use finance::SurrealFinancialEntryRepository;
pub use patient::{SurrealClinicalHistoryRepository, SurrealPatientRepository};
pub use prescription::SurrealPrescriptionRepository;
pub use professional::SurrealProfessionalRepository;
pub use schedule::SurrealScheduleRepository;
pub use supply::SurrealSupplyRepository;
pub use telemedicine::SurrealTelemedicineRepository;
pub use user::SurrealUserRepository;

use clinica_core::error::ClinicaError;
use uuid::Uuid;

use crate::error::DbError;

/// Parse a UUID stored as a string column.
pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {column} UUID: {e}")))
}

/// Turn a unique-index collision into a domain conflict carrying a
/// readable reason; any other failure passes through unchanged.
pub(crate) fn on_conflict(err: DbError, entity: &str, reason: &str) -> ClinicaError {
    match err {
        DbError::Conflict(_) => ClinicaError::conflict(entity, reason),
        other => other.into(),
    }
}
