//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations map unique-key
//! collisions to [`ClinicaError::Conflict`] and missing rows to
//! [`ClinicaError::NotFound`].
//!
//! [`ClinicaError::Conflict`]: crate::error::ClinicaError::Conflict
//! [`ClinicaError::NotFound`]: crate::error::ClinicaError::NotFound

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ClinicaResult;
use crate::models::{
    admission::Admission,
    appointment::Appointment,
    audit::{AuditLogEntry, CreateAuditLogEntry},
    bed::{Bed, CreateBed},
    clinical_note::{ClinicalNote, CreateClinicalNote},
    finance::{CreateFinancialEntry, FinancialEntry},
    patient::{
        ClinicalHistoryEntry, CreateClinicalHistoryEntry, CreatePatient, Patient, PatientFilter,
        UpdatePatient,
    },
    prescription::{CreatePrescription, Prescription},
    professional::{CreateProfessional, Professional},
    schedule::{CreateScheduleSlot, ScheduleSlot},
    supply::{CreateSupply, Supply},
    telemedicine::{CreateTelemedicineSession, TelemedicineSession},
    user::{NewUser, User},
};

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: NewUser) -> impl Future<Output = ClinicaResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ClinicaResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = ClinicaResult<User>> + Send;
    /// Credential rotation; the only mutation an identity supports.
    fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> impl Future<Output = ClinicaResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

pub trait PatientRepository: Send + Sync {
    fn create(&self, input: CreatePatient) -> impl Future<Output = ClinicaResult<Patient>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ClinicaResult<Patient>> + Send;
    fn list(&self, filter: PatientFilter)
    -> impl Future<Output = ClinicaResult<Vec<Patient>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePatient,
    ) -> impl Future<Output = ClinicaResult<Patient>> + Send;
    /// Delete the patient and every row that references it, releasing
    /// any slot or bed the patient still holds. Runs as one transaction.
    fn delete(&self, id: Uuid) -> impl Future<Output = ClinicaResult<()>> + Send;
}

pub trait ClinicalHistoryRepository: Send + Sync {
    fn create(
        &self,
        patient_id: Uuid,
        input: CreateClinicalHistoryEntry,
    ) -> impl Future<Output = ClinicaResult<ClinicalHistoryEntry>> + Send;
    fn list_by_patient(
        &self,
        patient_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Vec<ClinicalHistoryEntry>>> + Send;
}

// ---------------------------------------------------------------------------
// Professionals and schedules
// ---------------------------------------------------------------------------

pub trait ProfessionalRepository: Send + Sync {
    fn create(
        &self,
        input: CreateProfessional,
    ) -> impl Future<Output = ClinicaResult<Professional>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ClinicaResult<Professional>> + Send;
    /// First professional (oldest) with the given specialty.
    fn first_by_specialty(
        &self,
        specialty: &str,
    ) -> impl Future<Output = ClinicaResult<Professional>> + Send;
    fn list(&self) -> impl Future<Output = ClinicaResult<Vec<Professional>>> + Send;
}

pub trait ScheduleRepository: Send + Sync {
    fn create(
        &self,
        professional_id: Uuid,
        input: CreateScheduleSlot,
    ) -> impl Future<Output = ClinicaResult<ScheduleSlot>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ClinicaResult<ScheduleSlot>> + Send;
    /// The slot at `(professional_id, starts_at)`, if any, regardless of
    /// availability.
    fn find(
        &self,
        professional_id: Uuid,
        starts_at: DateTime<Utc>,
    ) -> impl Future<Output = ClinicaResult<Option<ScheduleSlot>>> + Send;
    fn list_by_professional(
        &self,
        professional_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Vec<ScheduleSlot>>> + Send;
}

// ---------------------------------------------------------------------------
// Allocated resources (read side; writes go through the ledger)
// ---------------------------------------------------------------------------

pub trait AppointmentRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ClinicaResult<Appointment>> + Send;
    fn list_by_patient(
        &self,
        patient_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Vec<Appointment>>> + Send;
}

pub trait BedRepository: Send + Sync {
    fn create(&self, input: CreateBed) -> impl Future<Output = ClinicaResult<Bed>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ClinicaResult<Bed>> + Send;
    fn list(&self) -> impl Future<Output = ClinicaResult<Vec<Bed>>> + Send;
}

pub trait AdmissionRepository: Send + Sync {
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ClinicaResult<Admission>> + Send;
    /// Newest first.
    fn list(&self) -> impl Future<Output = ClinicaResult<Vec<Admission>>> + Send;
    fn list_open_for_bed(
        &self,
        bed_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Vec<Admission>>> + Send;
}

// ---------------------------------------------------------------------------
// Clinical records
// ---------------------------------------------------------------------------

pub trait PrescriptionRepository: Send + Sync {
    fn create(
        &self,
        professional_id: Uuid,
        input: CreatePrescription,
    ) -> impl Future<Output = ClinicaResult<Prescription>> + Send;
    fn list_by_patient(
        &self,
        patient_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Vec<Prescription>>> + Send;
    fn list_by_professional(
        &self,
        professional_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Vec<Prescription>>> + Send;
}

pub trait ClinicalNoteRepository: Send + Sync {
    fn create(
        &self,
        professional_id: Uuid,
        input: CreateClinicalNote,
    ) -> impl Future<Output = ClinicaResult<ClinicalNote>> + Send;
    /// Newest first.
    fn list_by_patient(
        &self,
        patient_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Vec<ClinicalNote>>> + Send;
}

pub trait TelemedicineRepository: Send + Sync {
    fn create(
        &self,
        input: CreateTelemedicineSession,
    ) -> impl Future<Output = ClinicaResult<TelemedicineSession>> + Send;
    fn list_by_patient(
        &self,
        patient_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Vec<TelemedicineSession>>> + Send;
}

// ---------------------------------------------------------------------------
// Hospital administration
// ---------------------------------------------------------------------------

pub trait SupplyRepository: Send + Sync {
    fn create(&self, input: CreateSupply) -> impl Future<Output = ClinicaResult<Supply>> + Send;
    fn list(&self) -> impl Future<Output = ClinicaResult<Vec<Supply>>> + Send;
}

pub trait FinancialEntryRepository: Send + Sync {
    fn create(
        &self,
        input: CreateFinancialEntry,
    ) -> impl Future<Output = ClinicaResult<FinancialEntry>> + Send;
    /// Newest first.
    fn list(&self) -> impl Future<Output = ClinicaResult<Vec<FinancialEntry>>> + Send;
    /// Entries dated within `[from, to]`.
    fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = ClinicaResult<Vec<FinancialEntry>>> + Send;
}

// ---------------------------------------------------------------------------
// Audit (append-only)
// ---------------------------------------------------------------------------

/// Query filters for audit log entries.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub actor_email: Option<String>,
    pub endpoint: Option<String>,
}

pub trait AuditLogRepository: Send + Sync {
    /// Append a new audit log entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateAuditLogEntry,
    ) -> impl Future<Output = ClinicaResult<AuditLogEntry>> + Send;
    /// Newest first.
    fn list(
        &self,
        filter: AuditLogFilter,
    ) -> impl Future<Output = ClinicaResult<Vec<AuditLogEntry>>> + Send;
}
