//! Clinical progress notes.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use clinica_core::models::clinical_note::{ClinicalNote, CreateClinicalNote};
use clinica_core::repository::ClinicalNoteRepository;
use uuid::Uuid;

use super::audit;
use crate::error::ApiResult;
use crate::extract::{Admitted, Payload, Professional};
use crate::state::SharedState;

/// `POST` takes the professional id, `GET` the patient id.
pub fn routes() -> Router<SharedState> {
    Router::new().route("/evolucoes/:id", post(record).get(list))
}

async fn record(
    State(state): State<SharedState>,
    admitted: Admitted<Professional>,
    Path(professional_id): Path<Uuid>,
    Payload(input): Payload<CreateClinicalNote>,
) -> ApiResult<Json<ClinicalNote>> {
    input.validate()?;
    let note = state.clinical_notes().create(professional_id, input).await?;
    audit(
        &state,
        &admitted.context,
        format!(
            "Registro de evolução paciente {} pelo prof. {professional_id}",
            note.patient_id
        ),
    )
    .await;
    Ok(Json(note))
}

async fn list(
    State(state): State<SharedState>,
    admitted: Admitted<Professional>,
    Path(patient_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ClinicalNote>>> {
    let notes = state.clinical_notes().list_by_patient(patient_id).await?;
    audit(
        &state,
        &admitted.context,
        format!("Listagem de evoluções do paciente {patient_id}"),
    )
    .await;
    Ok(Json(notes))
}
