//! Resource allocation ledger.
//!
//! Two allocation state machines share one shape: a claim flips the
//! resource to taken, a release flips it back, and a second claim on a
//! taken resource is rejected. Implementations must make that rejection
//! hold under concurrent requests through the store itself (a unique
//! key or a lock held across the read-then-write span), never through
//! state cached in memory.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ClinicaResult;
use crate::models::admission::{Admission, CreateAdmission};
use crate::models::appointment::{Appointment, BookAppointment};

pub trait AllocationLedger: Send + Sync {
    /// Claim the slot of the first professional with the requested
    /// specialty at the requested time.
    ///
    /// Fails with `NotFound` for an unknown patient or specialty and
    /// `SlotUnavailable` when the slot does not exist or is taken.
    fn book_appointment(
        &self,
        patient_id: Uuid,
        input: BookAppointment,
    ) -> impl Future<Output = ClinicaResult<Appointment>> + Send;

    /// Cancel a scheduled appointment of `patient_id` and release its
    /// slot. A second cancellation fails with `AlreadyCancelled`.
    fn cancel_appointment(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Appointment>> + Send;

    /// Mark a scheduled appointment as completed. The slot stays
    /// consumed.
    fn complete_appointment(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
    ) -> impl Future<Output = ClinicaResult<Appointment>> + Send;

    /// Occupy a free bed with a new open admission. Fails with
    /// `BedOccupied` when the bed already has one.
    fn admit(&self, input: CreateAdmission)
    -> impl Future<Output = ClinicaResult<Admission>> + Send;

    /// Close an open admission and free its bed. Fails with
    /// `InvalidState` when the admission was already discharged.
    fn discharge(
        &self,
        admission_id: Uuid,
        discharged_at: DateTime<Utc>,
    ) -> impl Future<Output = ClinicaResult<Admission>> + Send;
}
