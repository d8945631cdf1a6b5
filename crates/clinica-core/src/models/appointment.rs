//! Appointment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClinicaError, ClinicaResult};
use crate::validation::require_text;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    #[serde(rename = "Agendada")]
    Scheduled,
    #[serde(rename = "Realizada")]
    Completed,
    #[serde(rename = "Cancelada")]
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Agendada",
            AppointmentStatus::Completed => "Realizada",
            AppointmentStatus::Cancelled => "Cancelada",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Agendada" => Some(AppointmentStatus::Scheduled),
            "Realizada" => Some(AppointmentStatus::Completed),
            "Cancelada" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    /// Check that `self -> next` is a legal transition. Only `Scheduled`
    /// may move, and only to a terminal state.
    pub fn ensure_transition(&self, next: AppointmentStatus) -> ClinicaResult<()> {
        match (self, next) {
            (AppointmentStatus::Scheduled, AppointmentStatus::Completed)
            | (AppointmentStatus::Scheduled, AppointmentStatus::Cancelled) => Ok(()),
            (AppointmentStatus::Cancelled, AppointmentStatus::Cancelled) => {
                Err(ClinicaError::AlreadyCancelled)
            }
            (from, to) => Err(ClinicaError::invalid_state(format!(
                "transição inválida: {} -> {}",
                from.as_str(),
                to.as_str()
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    #[serde(rename = "paciente_id")]
    pub patient_id: Uuid,
    #[serde(rename = "profissional_id")]
    pub professional_id: Uuid,
    #[serde(rename = "agenda_id")]
    pub slot_id: Uuid,
    #[serde(rename = "data_hora")]
    pub scheduled_for: DateTime<Utc>,
    #[serde(rename = "especialidade")]
    pub specialty: String,
    pub status: AppointmentStatus,
}

/// Booking request body (`POST /pacientes/{id}/consultas`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointment {
    #[serde(rename = "data_hora")]
    pub scheduled_for: DateTime<Utc>,
    #[serde(rename = "especialidade")]
    pub specialty: String,
}

impl BookAppointment {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("especialidade", &self.specialty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn scheduled_moves_to_either_terminal_state() {
        assert!(Scheduled.ensure_transition(Completed).is_ok());
        assert!(Scheduled.ensure_transition(Cancelled).is_ok());
    }

    #[test]
    fn cancelling_twice_is_reported_as_already_cancelled() {
        assert!(matches!(
            Cancelled.ensure_transition(Cancelled),
            Err(ClinicaError::AlreadyCancelled)
        ));
    }

    #[test]
    fn terminal_states_do_not_move() {
        assert!(matches!(
            Completed.ensure_transition(Cancelled),
            Err(ClinicaError::InvalidState { .. })
        ));
        assert!(matches!(
            Cancelled.ensure_transition(Completed),
            Err(ClinicaError::InvalidState { .. })
        ));
    }

    #[test]
    fn status_wire_names() {
        for status in [Scheduled, Completed, Cancelled] {
            assert_eq!(AppointmentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AppointmentStatus::parse("Pendente"), None);
    }
}
