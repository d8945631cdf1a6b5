//! HTTP routes, one module per resource group.

pub mod administracao;
pub mod evolucoes;
pub mod internacoes;
pub mod pacientes;
pub mod profissionais;
pub mod telemedicina;
pub mod usuarios;

use clinica_auth::RequestContext;

use crate::state::AppState;

/// Record an audited action for the caller of `ctx`.
async fn audit(state: &AppState, ctx: &RequestContext, description: impl Into<String>) {
    state
        .audit()
        .record(ctx.actor(&state.auth), &ctx.method, &ctx.path, description)
        .await;
}
