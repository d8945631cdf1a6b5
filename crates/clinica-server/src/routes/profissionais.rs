//! Professionals, their schedules and the prescriptions they issue.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use clinica_core::models::prescription::{CreatePrescription, Prescription};
use clinica_core::models::professional::{CreateProfessional, Professional};
use clinica_core::models::schedule::{CreateScheduleSlot, ScheduleSlot};
use clinica_core::repository::{
    PrescriptionRepository, ProfessionalRepository, ScheduleRepository,
};
use uuid::Uuid;

use super::audit;
use crate::error::{ApiError, ApiResult};
use crate::extract::{Admitted, Payload, Professional as ProfessionalRole};
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/profissionais", post(create).get(list))
        .route("/profissionais/:id/agenda", post(add_slot).get(list_slots))
        .route(
            "/profissionais/:id/prescricoes",
            post(prescribe).get(list_prescriptions),
        )
}

async fn create(
    State(state): State<SharedState>,
    Payload(input): Payload<CreateProfessional>,
) -> ApiResult<Json<Professional>> {
    input.validate().map_err(ApiError::registration)?;
    let professional = state
        .professionals()
        .create(input)
        .await
        .map_err(ApiError::registration)?;
    Ok(Json(professional))
}

async fn list(State(state): State<SharedState>) -> ApiResult<Json<Vec<Professional>>> {
    Ok(Json(state.professionals().list().await?))
}

async fn add_slot(
    State(state): State<SharedState>,
    _admitted: Admitted<ProfessionalRole>,
    Path(id): Path<Uuid>,
    Payload(input): Payload<CreateScheduleSlot>,
) -> ApiResult<Json<ScheduleSlot>> {
    let slot = state
        .schedules()
        .create(id, input)
        .await
        .map_err(ApiError::registration)?;
    Ok(Json(slot))
}

async fn list_slots(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ScheduleSlot>>> {
    Ok(Json(state.schedules().list_by_professional(id).await?))
}

async fn prescribe(
    State(state): State<SharedState>,
    admitted: Admitted<ProfessionalRole>,
    Path(id): Path<Uuid>,
    Payload(input): Payload<CreatePrescription>,
) -> ApiResult<Json<Prescription>> {
    input.validate()?;
    let prescription = state.prescriptions().create(id, input).await?;
    audit(
        &state,
        &admitted.context,
        format!(
            "Prescrição {} para o paciente {} pelo prof. {id}",
            prescription.id, prescription.patient_id
        ),
    )
    .await;
    Ok(Json(prescription))
}

async fn list_prescriptions(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Prescription>>> {
    Ok(Json(state.prescriptions().list_by_professional(id).await?))
}
