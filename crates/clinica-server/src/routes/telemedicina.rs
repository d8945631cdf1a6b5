//! Telemedicine consultations.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use clinica_core::models::telemedicine::{CreateTelemedicineSession, TelemedicineSession};
use clinica_core::repository::TelemedicineRepository;
use uuid::Uuid;

use super::audit;
use crate::error::ApiResult;
use crate::extract::{Admitted, Patient, Payload, Professional};
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/telemedicina", post(schedule))
        .route("/telemedicina/:paciente_id", get(list))
}

async fn schedule(
    State(state): State<SharedState>,
    admitted: Admitted<Professional>,
    Payload(input): Payload<CreateTelemedicineSession>,
) -> ApiResult<Json<TelemedicineSession>> {
    input.validate()?;
    let session = state.telemedicine().create(input).await?;
    audit(
        &state,
        &admitted.context,
        format!(
            "Teleconsulta {} do paciente {} com o prof. {}",
            session.id, session.patient_id, session.professional_id
        ),
    )
    .await;
    Ok(Json(session))
}

async fn list(
    State(state): State<SharedState>,
    _admitted: Admitted<Patient>,
    Path(patient_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TelemedicineSession>>> {
    Ok(Json(state.telemedicine().list_by_patient(patient_id).await?))
}
