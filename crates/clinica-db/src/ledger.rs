//! SurrealDB implementation of [`AllocationLedger`].
//!
//! Every claim transaction starts by creating a claim row whose record id
//! is the slot or bed id. Two concurrent claims on the same resource
//! collide on that key and the losing transaction is rolled back by the
//! store. Release transactions start with a state guard that `THROW`s
//! when the row has already left the expected state, so a racing
//! duplicate release fails the same way.
//!
//! Sequential failures (unknown ids, a resource already taken before the
//! request began) are detected up front so callers get the precise error.

use chrono::{DateTime, Utc};
use clinica_core::error::{ClinicaError, ClinicaResult};
use clinica_core::ledger::AllocationLedger;
use clinica_core::models::admission::{Admission, CreateAdmission, Discharge};
use clinica_core::models::appointment::{Appointment, AppointmentStatus, BookAppointment};
use clinica_core::repository::{
    AdmissionRepository, AppointmentRepository, BedRepository, PatientRepository,
    ProfessionalRepository, ScheduleRepository,
};
use surrealdb::method::Query;
use surrealdb::{Connection, Surreal};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{
    SurrealAdmissionRepository, SurrealAppointmentRepository, SurrealBedRepository,
    SurrealPatientRepository, SurrealProfessionalRepository, SurrealScheduleRepository,
};

const CLAIM_SLOT: &str = "\
BEGIN TRANSACTION;
CREATE type::record('slot_claim', $slot_id) SET \
    slot_id = $slot_id, appointment_id = $appointment_id, patient_id = $patient_id;
UPDATE type::record('schedule_slot', $slot_id) SET available = false;
CREATE type::record('appointment', $appointment_id) SET \
    patient_id = $patient_id, professional_id = $professional_id, \
    slot_id = $slot_id, scheduled_for = $scheduled_for, \
    specialty = $specialty, status = 'Agendada';
COMMIT TRANSACTION;
";

const CANCEL_APPOINTMENT: &str = "\
BEGIN TRANSACTION;
IF (SELECT VALUE status FROM ONLY type::record('appointment', $appointment_id)) != 'Agendada' \
    { THROW 'guard:appointment_not_scheduled' };
UPDATE type::record('appointment', $appointment_id) SET status = 'Cancelada';
UPDATE type::record('schedule_slot', $slot_id) SET available = true;
DELETE type::record('slot_claim', $slot_id);
COMMIT TRANSACTION;
";

const COMPLETE_APPOINTMENT: &str = "\
BEGIN TRANSACTION;
IF (SELECT VALUE status FROM ONLY type::record('appointment', $appointment_id)) != 'Agendada' \
    { THROW 'guard:appointment_not_scheduled' };
UPDATE type::record('appointment', $appointment_id) SET status = 'Realizada';
COMMIT TRANSACTION;
";

const CLAIM_BED: &str = "\
BEGIN TRANSACTION;
CREATE type::record('bed_claim', $bed_id) SET \
    bed_id = $bed_id, admission_id = $admission_id, patient_id = $patient_id;
UPDATE type::record('bed', $bed_id) SET occupied = true;
CREATE type::record('admission', $admission_id) SET \
    patient_id = $patient_id, bed_id = $bed_id, admitted_at = $admitted_at, \
    discharged_at = NONE, reason = $reason;
COMMIT TRANSACTION;
";

const DISCHARGE: &str = "\
BEGIN TRANSACTION;
IF (SELECT VALUE discharged_at FROM ONLY type::record('admission', $admission_id)) != NONE \
    { THROW 'guard:admission_closed' };
UPDATE type::record('admission', $admission_id) SET discharged_at = $discharged_at;
UPDATE type::record('bed', $bed_id) SET occupied = false;
DELETE type::record('bed_claim', $bed_id);
COMMIT TRANSACTION;
";

/// Outcome of an allocation transaction that did not commit.
enum Rejected {
    /// Lost to a concurrent claim or tripped a state guard.
    Contended(DbError),
    /// Any other storage failure.
    Failed(DbError),
}

/// Run an allocation transaction, separating contention from storage
/// failures.
async fn run_transaction<C: Connection>(query: Query<'_, C>) -> Result<(), Rejected> {
    let classify = |err: surrealdb::Error| match DbError::from_statement(err) {
        e @ (DbError::Conflict(_) | DbError::Aborted(_)) => Rejected::Contended(e),
        e => Rejected::Failed(e),
    };

    query.await.map_err(classify)?.check().map_err(classify)?;
    Ok(())
}

/// Resource allocation ledger backed by SurrealDB transactions.
#[derive(Clone)]
pub struct SurrealAllocationLedger<C: Connection> {
    db: Surreal<C>,
    patients: SurrealPatientRepository<C>,
    professionals: SurrealProfessionalRepository<C>,
    schedules: SurrealScheduleRepository<C>,
    appointments: SurrealAppointmentRepository<C>,
    beds: SurrealBedRepository<C>,
    admissions: SurrealAdmissionRepository<C>,
}

impl<C: Connection> SurrealAllocationLedger<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            patients: SurrealPatientRepository::new(db.clone()),
            professionals: SurrealProfessionalRepository::new(db.clone()),
            schedules: SurrealScheduleRepository::new(db.clone()),
            appointments: SurrealAppointmentRepository::new(db.clone()),
            beds: SurrealBedRepository::new(db.clone()),
            admissions: SurrealAdmissionRepository::new(db.clone()),
            db,
        }
    }

    /// Load an appointment and check it belongs to `patient_id`.
    async fn owned_appointment(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
    ) -> ClinicaResult<Appointment> {
        let appointment = self.appointments.get_by_id(appointment_id).await?;
        if appointment.patient_id != patient_id {
            return Err(ClinicaError::not_found("Agendamento", appointment_id));
        }
        Ok(appointment)
    }

    /// Apply a status transition guarded inside the transaction. When the
    /// guard trips, the current status decides which error is reported.
    async fn transition(
        &self,
        appointment: &Appointment,
        next: AppointmentStatus,
        statement: &str,
    ) -> ClinicaResult<Appointment> {
        appointment.status.ensure_transition(next)?;

        let query = self
            .db
            .query(statement)
            .bind(("appointment_id", appointment.id.to_string()))
            .bind(("slot_id", appointment.slot_id.to_string()));

        match run_transaction(query).await {
            Ok(()) => self.appointments.get_by_id(appointment.id).await,
            Err(Rejected::Contended(err)) => {
                warn!(
                    appointment_id = %appointment.id,
                    error = %err,
                    "Appointment transition lost to a concurrent update"
                );
                let current = self.appointments.get_by_id(appointment.id).await?;
                current.status.ensure_transition(next)?;
                Err(DbError::Aborted(err.to_string()).into())
            }
            Err(Rejected::Failed(err)) => Err(err.into()),
        }
    }
}

impl<C: Connection> AllocationLedger for SurrealAllocationLedger<C> {
    async fn book_appointment(
        &self,
        patient_id: Uuid,
        input: BookAppointment,
    ) -> ClinicaResult<Appointment> {
        input.validate()?;
        self.patients.get_by_id(patient_id).await?;
        let professional = self
            .professionals
            .first_by_specialty(&input.specialty)
            .await?;

        let slot = match self
            .schedules
            .find(professional.id, input.scheduled_for)
            .await?
        {
            Some(slot) if slot.available => slot,
            _ => return Err(ClinicaError::SlotUnavailable),
        };

        let appointment_id = Uuid::new_v4();
        let query = self
            .db
            .query(CLAIM_SLOT)
            .bind(("slot_id", slot.id.to_string()))
            .bind(("appointment_id", appointment_id.to_string()))
            .bind(("patient_id", patient_id.to_string()))
            .bind(("professional_id", professional.id.to_string()))
            .bind(("scheduled_for", input.scheduled_for))
            .bind(("specialty", input.specialty));

        match run_transaction(query).await {
            Ok(()) => {}
            Err(Rejected::Contended(err)) => {
                warn!(slot_id = %slot.id, error = %err, "Slot claim rejected");
                return Err(ClinicaError::SlotUnavailable);
            }
            Err(Rejected::Failed(err)) => return Err(err.into()),
        }

        info!(
            appointment_id = %appointment_id,
            slot_id = %slot.id,
            patient_id = %patient_id,
            "Slot claimed"
        );
        self.appointments.get_by_id(appointment_id).await
    }

    async fn cancel_appointment(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
    ) -> ClinicaResult<Appointment> {
        let appointment = self.owned_appointment(patient_id, appointment_id).await?;
        let cancelled = self
            .transition(&appointment, AppointmentStatus::Cancelled, CANCEL_APPOINTMENT)
            .await?;

        info!(
            appointment_id = %appointment_id,
            slot_id = %appointment.slot_id,
            "Slot released"
        );
        Ok(cancelled)
    }

    async fn complete_appointment(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
    ) -> ClinicaResult<Appointment> {
        let appointment = self.owned_appointment(patient_id, appointment_id).await?;
        let completed = self
            .transition(&appointment, AppointmentStatus::Completed, COMPLETE_APPOINTMENT)
            .await?;

        info!(appointment_id = %appointment_id, "Appointment completed");
        Ok(completed)
    }

    async fn admit(&self, input: CreateAdmission) -> ClinicaResult<Admission> {
        input.validate()?;
        self.patients.get_by_id(input.patient_id).await?;
        let bed = self.beds.get_by_id(input.bed_id).await?;
        if bed.occupied {
            return Err(ClinicaError::BedOccupied);
        }

        let admission_id = Uuid::new_v4();
        let query = self
            .db
            .query(CLAIM_BED)
            .bind(("bed_id", bed.id.to_string()))
            .bind(("admission_id", admission_id.to_string()))
            .bind(("patient_id", input.patient_id.to_string()))
            .bind(("admitted_at", input.admitted_at))
            .bind(("reason", input.reason));

        match run_transaction(query).await {
            Ok(()) => {}
            Err(Rejected::Contended(err)) => {
                warn!(bed_id = %bed.id, error = %err, "Bed claim rejected");
                return Err(ClinicaError::BedOccupied);
            }
            Err(Rejected::Failed(err)) => return Err(err.into()),
        }

        info!(
            admission_id = %admission_id,
            bed_id = %bed.id,
            patient_id = %input.patient_id,
            "Bed claimed"
        );
        self.admissions.get_by_id(admission_id).await
    }

    async fn discharge(
        &self,
        admission_id: Uuid,
        discharged_at: DateTime<Utc>,
    ) -> ClinicaResult<Admission> {
        let admission = self.admissions.get_by_id(admission_id).await?;
        if !admission.is_open() {
            return Err(ClinicaError::invalid_state("Paciente já recebeu alta"));
        }
        Discharge { discharged_at }.validate_against(&admission)?;

        let query = self
            .db
            .query(DISCHARGE)
            .bind(("admission_id", admission_id.to_string()))
            .bind(("bed_id", admission.bed_id.to_string()))
            .bind(("discharged_at", discharged_at));

        match run_transaction(query).await {
            Ok(()) => {}
            Err(Rejected::Contended(err)) => {
                warn!(admission_id = %admission_id, error = %err, "Discharge rejected");
                return Err(ClinicaError::invalid_state("Paciente já recebeu alta"));
            }
            Err(Rejected::Failed(err)) => return Err(err.into()),
        }

        info!(
            admission_id = %admission_id,
            bed_id = %admission.bed_id,
            "Bed released"
        );
        self.admissions.get_by_id(admission_id).await
    }
}
