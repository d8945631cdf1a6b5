//! Admissions. Every route is restricted to administrators.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use clinica_core::ledger::AllocationLedger;
use clinica_core::models::admission::{Admission, CreateAdmission, Discharge};
use clinica_core::repository::AdmissionRepository;
use uuid::Uuid;

use super::audit;
use crate::error::ApiResult;
use crate::extract::{Admin, Admitted, Payload};
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/internacoes", post(admit).get(list))
        .route("/internacoes/:id/alta", put(discharge))
}

async fn admit(
    State(state): State<SharedState>,
    admitted: Admitted<Admin>,
    Payload(input): Payload<CreateAdmission>,
) -> ApiResult<(StatusCode, Json<Admission>)> {
    let admission = state.ledger.admit(input).await?;
    audit(
        &state,
        &admitted.context,
        format!(
            "Internação do paciente {} no leito {}",
            admission.patient_id, admission.bed_id
        ),
    )
    .await;
    Ok((StatusCode::CREATED, Json(admission)))
}

async fn discharge(
    State(state): State<SharedState>,
    admitted: Admitted<Admin>,
    Path(id): Path<Uuid>,
    Payload(input): Payload<Discharge>,
) -> ApiResult<Json<Admission>> {
    let admission = state.ledger.discharge(id, input.discharged_at).await?;
    audit(
        &state,
        &admitted.context,
        format!("Alta da internação {id}, liberado leito {}", admission.bed_id),
    )
    .await;
    Ok(Json(admission))
}

async fn list(
    State(state): State<SharedState>,
    admitted: Admitted<Admin>,
) -> ApiResult<Json<Vec<Admission>>> {
    let admissions = state.admissions().list().await?;
    audit(&state, &admitted.context, "Listagem de internações").await;
    Ok(Json(admissions))
}
