//! Shared application state.

use std::sync::Arc;

use clinica_auth::{AccessGuard, AuditWriter, AuthConfig, AuthService};
use clinica_db::SurrealAllocationLedger;
use clinica_db::repository::{
    SurrealAdmissionRepository, SurrealAppointmentRepository, SurrealAuditLogRepository, SurrealBedRepository,
    SurrealClinicalHistoryRepository, SurrealClinicalNoteRepository,
    SurrealFinancialEntryRepository, SurrealPatientRepository, SurrealPrescriptionRepository,
    SurrealProfessionalRepository, SurrealScheduleRepository, SurrealSupplyRepository,
    SurrealTelemedicineRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use crate::mail::Mailer;

pub type Db = Surreal<Any>;
pub type SharedState = Arc<AppState>;

/// Everything a handler needs. Built once at startup, never mutated.
pub struct AppState {
    pub db: Db,
    pub auth: Arc<AuthConfig>,
    pub guard: AccessGuard<SurrealAuditLogRepository<Any>>,
    pub ledger: SurrealAllocationLedger<Any>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(db: Db, auth: AuthConfig, mailer: Arc<dyn Mailer>) -> Self {
        let auth = Arc::new(auth);
        let audit = AuditWriter::new(SurrealAuditLogRepository::new(db.clone()));
        Self {
            guard: AccessGuard::new(auth.clone(), audit),
            ledger: SurrealAllocationLedger::new(db.clone()),
            db,
            auth,
            mailer,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    pub fn audit(&self) -> &AuditWriter<SurrealAuditLogRepository<Any>> {
        self.guard.audit()
    }

    pub fn auth_service(&self) -> AuthService<SurrealUserRepository<Any>> {
        AuthService::new(self.users(), self.auth.as_ref().clone())
    }

    pub fn users(&self) -> SurrealUserRepository<Any> {
        SurrealUserRepository::new(self.db.clone())
    }

    pub fn patients(&self) -> SurrealPatientRepository<Any> {
        SurrealPatientRepository::new(self.db.clone())
    }

    pub fn history(&self) -> SurrealClinicalHistoryRepository<Any> {
        SurrealClinicalHistoryRepository::new(self.db.clone())
    }

    pub fn professionals(&self) -> SurrealProfessionalRepository<Any> {
        SurrealProfessionalRepository::new(self.db.clone())
    }

    pub fn schedules(&self) -> SurrealScheduleRepository<Any> {
        SurrealScheduleRepository::new(self.db.clone())
    }

    pub fn appointments(&self) -> SurrealAppointmentRepository<Any> {
        SurrealAppointmentRepository::new(self.db.clone())
    }

    pub fn admissions(&self) -> SurrealAdmissionRepository<Any> {
        SurrealAdmissionRepository::new(self.db.clone())
    }

    pub fn beds(&self) -> SurrealBedRepository<Any> {
        SurrealBedRepository::new(self.db.clone())
    }

    pub fn prescriptions(&self) -> SurrealPrescriptionRepository<Any> {
        SurrealPrescriptionRepository::new(self.db.clone())
    }

    pub fn clinical_notes(&self) -> SurrealClinicalNoteRepository<Any> {
        SurrealClinicalNoteRepository::new(self.db.clone())
    }

    pub fn telemedicine(&self) -> SurrealTelemedicineRepository<Any> {
        SurrealTelemedicineRepository::new(self.db.clone())
    }

    pub fn supplies(&self) -> SurrealSupplyRepository<Any> {
        SurrealSupplyRepository::new(self.db.clone())
    }

    pub fn finance(&self) -> SurrealFinancialEntryRepository<Any> {
        SurrealFinancialEntryRepository::new(self.db.clone())
    }
}
