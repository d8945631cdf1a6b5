//! Identity registration, login, password rotation and the admin-only
//! route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use clinica_auth::{AuthError, LoginInput, LoginOutput};
use clinica_core::models::user::{CreateUser, User};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::audit;
use crate::error::{ApiError, ApiResult};
use crate::extract::{Admin, Admitted, Authenticated, Payload};
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/usuarios", post(register))
        .route("/usuarios/login", post(login))
        .route("/usuarios/senha", put(rotate_password))
        .route("/usuarios/restrito", get(admin_only))
}

async fn register(
    State(state): State<SharedState>,
    Payload(input): Payload<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state
        .auth_service()
        .register(input)
        .await
        .map_err(ApiError::registration)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<SharedState>,
    Payload(input): Payload<LoginInput>,
) -> ApiResult<Json<LoginOutput>> {
    Ok(Json(state.auth_service().login(input).await?))
}

#[derive(Debug, Deserialize)]
struct PasswordChange {
    senha_atual: String,
    nova_senha: String,
}

async fn rotate_password(
    State(state): State<SharedState>,
    caller: Authenticated,
    Payload(input): Payload<PasswordChange>,
) -> ApiResult<StatusCode> {
    let user_id = Uuid::parse_str(&caller.claims.sub)
        .map_err(|e| AuthError::TokenInvalid(format!("sub: {e}")))?;

    state
        .auth_service()
        .rotate_password(user_id, &input.senha_atual, &input.nova_senha)
        .await?;
    audit(&state, &caller.context, "Troca de senha").await;
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_only(_admitted: Admitted<Admin>) -> Json<Value> {
    Json(json!({ "mensagem": "Você tem permissão de Administrador!" }))
}
