//! Patient records, clinical history, appointments and prescriptions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use clinica_core::ledger::AllocationLedger;
use clinica_core::models::appointment::{Appointment, BookAppointment};
use clinica_core::models::patient::{
    ClinicalHistoryEntry, CreateClinicalHistoryEntry, CreatePatient, Patient, PatientFilter,
    UpdatePatient,
};
use clinica_core::models::prescription::Prescription;
use clinica_core::repository::{
    AppointmentRepository, ClinicalHistoryRepository, PatientRepository, PrescriptionRepository,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::audit;
use crate::error::ApiResult;
use crate::extract::{Admitted, Context, Patient as PatientRole, Payload, Professional};
use crate::mail::{self, Mail};
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/pacientes", post(create).get(list))
        .route("/pacientes/:id", get(fetch).put(update).delete(remove))
        .route("/pacientes/:id/historico", post(add_history).get(list_history))
        .route("/pacientes/:id/consultas", post(book).get(list_appointments))
        .route("/pacientes/:id/consultas/:consulta_id", delete(cancel))
        .route("/pacientes/:id/consultas/:consulta_id/realizada", put(complete))
        .route("/pacientes/:id/prescricoes", get(list_prescriptions))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    email: Option<String>,
}

async fn create(
    State(state): State<SharedState>,
    Payload(input): Payload<CreatePatient>,
) -> ApiResult<Json<Patient>> {
    input.validate()?;
    Ok(Json(state.patients().create(input).await?))
}

async fn list(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Patient>>> {
    let filter = PatientFilter { email: query.email };
    Ok(Json(state.patients().list(filter).await?))
}

async fn fetch(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Patient>> {
    Ok(Json(state.patients().get_by_id(id).await?))
}

async fn update(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Payload(input): Payload<UpdatePatient>,
) -> ApiResult<Json<Patient>> {
    input.validate()?;
    Ok(Json(state.patients().update(id, input).await?))
}

async fn remove(
    State(state): State<SharedState>,
    Context(ctx): Context,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.patients().delete(id).await?;
    audit(&state, &ctx, format!("Exclusão do paciente {id}")).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_history(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Payload(input): Payload<CreateClinicalHistoryEntry>,
) -> ApiResult<Json<ClinicalHistoryEntry>> {
    input.validate()?;
    Ok(Json(state.history().create(id, input).await?))
}

async fn list_history(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ClinicalHistoryEntry>>> {
    state.patients().get_by_id(id).await?;
    Ok(Json(state.history().list_by_patient(id).await?))
}

async fn book(
    State(state): State<SharedState>,
    Context(ctx): Context,
    Path(id): Path<Uuid>,
    Payload(input): Payload<BookAppointment>,
) -> ApiResult<Json<Appointment>> {
    let patient = state.patients().get_by_id(id).await?;
    let appointment = state.ledger.book_appointment(id, input).await?;

    audit(
        &state,
        &ctx,
        format!(
            "Agendamento {} do paciente {id} com o prof. {}",
            appointment.id, appointment.professional_id
        ),
    )
    .await;
    mail::send_detached(
        state.mailer.clone(),
        Mail::appointment_booked(&patient.email, appointment.scheduled_for),
    );
    Ok(Json(appointment))
}

async fn list_appointments(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(state.appointments().list_by_patient(id).await?))
}

async fn cancel(
    State(state): State<SharedState>,
    Context(ctx): Context,
    Path((id, appointment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    let patient = state.patients().get_by_id(id).await?;
    let appointment = state.ledger.cancel_appointment(id, appointment_id).await?;

    audit(
        &state,
        &ctx,
        format!(
            "Cancelamento do agendamento {appointment_id}, liberado horário {}",
            appointment.slot_id
        ),
    )
    .await;
    mail::send_detached(
        state.mailer.clone(),
        Mail::appointment_cancelled(&patient.email, appointment.scheduled_for),
    );
    Ok(Json(json!({ "mensagem": "Consulta cancelada com sucesso" })))
}

async fn complete(
    State(state): State<SharedState>,
    admitted: Admitted<Professional>,
    Path((id, appointment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Appointment>> {
    let appointment = state.ledger.complete_appointment(id, appointment_id).await?;
    audit(
        &state,
        &admitted.context,
        format!("Agendamento {appointment_id} realizado"),
    )
    .await;
    Ok(Json(appointment))
}

async fn list_prescriptions(
    State(state): State<SharedState>,
    _admitted: Admitted<PatientRole>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Prescription>>> {
    Ok(Json(state.prescriptions().list_by_patient(id).await?))
}
