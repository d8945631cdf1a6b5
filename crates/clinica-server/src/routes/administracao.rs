//! Hospital administration: beds, supplies, finance and the audit trail.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use clinica_core::models::audit::AuditLogEntry;
use clinica_core::models::bed::{Bed, CreateBed};
use clinica_core::models::finance::{
    self, CreateFinancialEntry, FinancialEntry, FinancialSummary,
};
use clinica_core::models::supply::{CreateSupply, Supply};
use clinica_core::repository::{
    AuditLogFilter, AuditLogRepository, BedRepository, FinancialEntryRepository,
    SupplyRepository,
};
use serde::Deserialize;

use super::audit;
use crate::error::{ApiError, ApiResult};
use crate::extract::{Admin, Admitted, Payload};
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/administracao/leitos", get(list_beds).post(create_bed))
        .route(
            "/administracao/suprimentos",
            get(list_supplies).post(create_supply),
        )
        .route(
            "/administracao/financeiro",
            get(list_entries).post(create_entry),
        )
        .route("/administracao/financeiro/resumo", get(summary))
        .route("/administracao/logs", get(list_logs))
}

async fn create_bed(
    State(state): State<SharedState>,
    admitted: Admitted<Admin>,
    Payload(input): Payload<CreateBed>,
) -> ApiResult<Json<Bed>> {
    input.validate()?;
    let bed = state.beds().create(input).await?;
    audit(
        &state,
        &admitted.context,
        format!("Cadastro do leito {} ({})", bed.number, bed.id),
    )
    .await;
    Ok(Json(bed))
}

async fn list_beds(State(state): State<SharedState>) -> ApiResult<Json<Vec<Bed>>> {
    Ok(Json(state.beds().list().await?))
}

async fn create_supply(
    State(state): State<SharedState>,
    admitted: Admitted<Admin>,
    Payload(input): Payload<CreateSupply>,
) -> ApiResult<Json<Supply>> {
    input.validate()?;
    let supply = state.supplies().create(input).await?;
    audit(
        &state,
        &admitted.context,
        format!("Cadastro do suprimento {}", supply.name),
    )
    .await;
    Ok(Json(supply))
}

async fn list_supplies(State(state): State<SharedState>) -> ApiResult<Json<Vec<Supply>>> {
    Ok(Json(state.supplies().list().await?))
}

async fn create_entry(
    State(state): State<SharedState>,
    admitted: Admitted<Admin>,
    Payload(input): Payload<CreateFinancialEntry>,
) -> ApiResult<Json<FinancialEntry>> {
    input.validate()?;
    let entry = state.finance().create(input).await?;
    audit(
        &state,
        &admitted.context,
        format!("Lançamento de {} {:.2} ({})", entry.kind, entry.amount, entry.category),
    )
    .await;
    Ok(Json(entry))
}

async fn list_entries(State(state): State<SharedState>) -> ApiResult<Json<Vec<FinancialEntry>>> {
    Ok(Json(state.finance().list().await?))
}

#[derive(Debug, Deserialize)]
struct PeriodQuery {
    inicio: DateTime<Utc>,
    fim: DateTime<Utc>,
}

async fn summary(
    State(state): State<SharedState>,
    Query(period): Query<PeriodQuery>,
) -> ApiResult<Json<FinancialSummary>> {
    finance::ensure_period(period.inicio, period.fim).map_err(ApiError::query)?;
    let entries = state.finance().list_between(period.inicio, period.fim).await?;
    let summary =
        finance::summarize(&entries, period.inicio, period.fim).map_err(ApiError::query)?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    email: Option<String>,
}

async fn list_logs(
    State(state): State<SharedState>,
    _admitted: Admitted<Admin>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    let filter = AuditLogFilter {
        actor_email: query.email,
        endpoint: None,
    };
    Ok(Json(state.audit().repository().list(filter).await?))
}
