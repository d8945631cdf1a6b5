//! Clinica Server — HTTP+JSON surface over the Clinica domain.
//!
//! - [`settings`]: layered configuration
//! - [`logging`]: tracing subscriber with a rotating log file
//! - [`state`]: shared application state
//! - [`routes`]: handlers grouped by resource

pub mod error;
pub mod extract;
pub mod logging;
pub mod mail;
pub mod routes;
pub mod settings;
pub mod state;

use axum::Router;

pub use state::{AppState, SharedState};

/// Assemble every route group over `state`.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .merge(routes::usuarios::routes())
        .merge(routes::pacientes::routes())
        .merge(routes::profissionais::routes())
        .merge(routes::evolucoes::routes())
        .merge(routes::telemedicina::routes())
        .merge(routes::internacoes::routes())
        .merge(routes::administracao::routes())
        .with_state(state)
}
