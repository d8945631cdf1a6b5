//! End-to-end HTTP tests: the full router over in-memory SurrealDB.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use clinica_auth::{AccessTokenClaims, AuthConfig};
use clinica_core::models::user::Role;
use clinica_core::repository::{AuditLogFilter, AuditLogRepository};
use clinica_db::run_migrations;
use clinica_server::mail::{Mail, MailError, Mailer};
use clinica_server::{AppState, SharedState, build_router};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

const SECRET: &str = "http-test-secret";

/// Forwards every mail to the test through a channel.
struct RecordingMailer(mpsc::UnboundedSender<Mail>);

impl Mailer for RecordingMailer {
    fn send(&self, mail: &Mail) -> Result<(), MailError> {
        let _ = self.0.send(mail.clone());
        Ok(())
    }
}

struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _mail: &Mail) -> Result<(), MailError> {
        Err(MailError::Transport("smtp unreachable".into()))
    }
}

async fn app_with(mailer: Arc<dyn Mailer>) -> (Router, SharedState) {
    let db = surrealdb::engine::any::connect("mem://").await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    run_migrations(&db).await.unwrap();

    let auth = AuthConfig {
        jwt_secret: SECRET.into(),
        ..Default::default()
    };
    let state = AppState::new(db, auth, mailer).shared();
    (build_router(state.clone()), state)
}

async fn app() -> (Router, SharedState, mpsc::UnboundedReceiver<Mail>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (router, state) = app_with(Arc::new(RecordingMailer(tx))).await;
    (router, state, rx)
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register an identity and return its bearer token.
async fn token_for(app: &Router, email: &str, role: &str) -> String {
    let (status, _) = call(
        app,
        Method::POST,
        "/usuarios",
        None,
        Some(json!({ "nome": "Usuário", "email": email, "senha": "senha-forte", "perfil": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        app,
        Method::POST,
        "/usuarios/login",
        None,
        Some(json!({ "email": email, "senha": "senha-forte" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

fn maria() -> Value {
    json!({
        "nome": "Maria",
        "email": "maria@email.com",
        "telefone": "11999999999",
        "data_nascimento": "1990-05-10"
    })
}

async fn create_patient(app: &Router, body: Value) -> String {
    let (status, body) = call(app, Method::POST, "/pacientes", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

fn token_signed_with(secret: &str, role: Role, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: "00000000-0000-0000-0000-000000000000".into(),
        email: "intruso@email.com".into(),
        role,
        iat: now - 3600,
        exp: now + exp_offset_secs,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn patient_registration_rejects_duplicate_email() {
    let (app, _state, _mail) = app().await;

    let id = create_patient(&app, maria()).await;
    assert!(!id.is_empty());

    let (status, body) = call(&app, Method::POST, "/pacientes", None, Some(maria())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Email já cadastrado");
}

#[tokio::test]
async fn user_registration_and_login() {
    let (app, _state, _mail) = app().await;
    let user = json!({
        "nome": "Admin",
        "email": "admin@clinica.com",
        "senha": "senha-forte",
        "perfil": "Administrador"
    });

    let (status, body) = call(&app, Method::POST, "/usuarios", None, Some(user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["perfil"], "Administrador");
    assert!(body.get("password_hash").is_none());

    let (status, body) = call(&app, Method::POST, "/usuarios", None, Some(user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email já cadastrado");

    let (status, body) = call(
        &app,
        Method::POST,
        "/usuarios/login",
        None,
        Some(json!({ "email": "admin@clinica.com", "senha": "senha-forte" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        "/usuarios/login",
        None,
        Some(json!({ "email": "admin@clinica.com", "senha": "errada-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Credenciais inválidas");

    let (status, body) = call(&app, Method::GET, "/usuarios/restrito", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensagem"], "Você tem permissão de Administrador!");
}

#[tokio::test]
async fn bad_tokens_are_unauthenticated_never_forbidden() {
    let (app, _state, _mail) = app().await;

    let forged = token_signed_with("outro-segredo", Role::Patient, 3600);
    let (status, _) = call(&app, Method::GET, "/usuarios/restrito", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = token_signed_with(SECRET, Role::Patient, -60);
    let (status, body) = call(&app, Method::GET, "/usuarios/restrito", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token expirado");

    let (status, _) = call(&app, Method::GET, "/internacoes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_role_is_forbidden_and_not_audited() {
    let (app, state, _mail) = app().await;
    let patient = token_for(&app, "paciente@email.com", "Paciente").await;

    let (status, body) = call(&app, Method::GET, "/internacoes", Some(&patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Acesso negado");

    let entries = state
        .audit()
        .repository()
        .list(AuditLogFilter {
            actor_email: Some("paciente@email.com".into()),
            endpoint: None,
        })
        .await
        .unwrap();
    assert!(entries.is_empty());

    let admin = token_for(&app, "admin@clinica.com", "Administrador").await;
    let (status, _) = call(&app, Method::GET, "/internacoes", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, logs) = call(
        &app,
        Method::GET,
        "/administracao/logs?email=admin@clinica.com",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let descriptions: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["descricao"].as_str().unwrap())
        .collect();
    assert!(descriptions.contains(&"Listagem de internações"));
    assert!(descriptions.contains(&"Acesso permitido ao perfil Administrador"));
}

/// Professional with one open slot; returns (professional id, slot time).
async fn professional_with_slot(app: &Router) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/profissionais",
        None,
        Some(json!({
            "nome": "Dr. Souza",
            "email": "souza@clinica.com",
            "especialidade": "Cardiologia",
            "registro_conselho": "CRM-1234"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let professional_id = body["id"].as_str().unwrap().to_string();

    let token = token_for(app, "souza@clinica.com", "Profissional").await;
    let when = "2030-07-01T14:30:00Z".to_string();
    let (status, body) = call(
        app,
        Method::POST,
        &format!("/profissionais/{professional_id}/agenda"),
        Some(&token),
        Some(json!({ "data_hora": when })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disponivel"], true);

    let (status, body) = call(
        app,
        Method::POST,
        &format!("/profissionais/{professional_id}/agenda"),
        Some(&token),
        Some(json!({ "data_hora": when })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Horário já existe");

    (professional_id, when)
}

#[tokio::test]
async fn booking_and_cancellation_flow() {
    let (app, _state, mut mail) = app().await;
    let (professional_id, when) = professional_with_slot(&app).await;
    let patient_id = create_patient(&app, maria()).await;
    let booking = json!({ "data_hora": when, "especialidade": "Cardiologia" });

    let (status, appointment) = call(
        &app,
        Method::POST,
        &format!("/pacientes/{patient_id}/consultas"),
        None,
        Some(booking.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(appointment["status"], "Agendada");
    assert_eq!(appointment["profissional_id"], professional_id.as_str());

    let sent = mail.recv().await.unwrap();
    assert_eq!(sent.to, "maria@email.com");
    assert_eq!(sent.body, "Sua consulta foi marcada para 01/07/2030 14:30.");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/pacientes/{patient_id}/consultas"),
        None,
        Some(booking),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Horário indisponível");

    let cancel_uri = format!(
        "/pacientes/{patient_id}/consultas/{}",
        appointment["id"].as_str().unwrap()
    );
    let (status, body) = call(&app, Method::DELETE, &cancel_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensagem"], "Consulta cancelada com sucesso");

    let (status, body) = call(&app, Method::DELETE, &cancel_uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Consulta já cancelada");

    let (_, slots) = call(
        &app,
        Method::GET,
        &format!("/profissionais/{professional_id}/agenda"),
        None,
        None,
    )
    .await;
    assert_eq!(slots[0]["disponivel"], true);
}

#[tokio::test]
async fn failing_mailer_does_not_fail_the_booking() {
    let (app, _state) = app_with(Arc::new(FailingMailer)).await;
    let (_, when) = professional_with_slot(&app).await;
    let patient_id = create_patient(&app, maria()).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/pacientes/{patient_id}/consultas"),
        None,
        Some(json!({ "data_hora": when, "especialidade": "Cardiologia" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Agendada");
}

#[tokio::test]
async fn admission_occupies_bed_until_discharge() {
    let (app, _state, _mail) = app().await;
    let admin = token_for(&app, "admin@clinica.com", "Administrador").await;
    let patient_id = create_patient(&app, maria()).await;

    let (status, bed) = call(
        &app,
        Method::POST,
        "/administracao/leitos",
        Some(&admin),
        Some(json!({ "numero": "101-A", "tipo": "UTI", "unidade": "Central" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bed["ocupado"], false);
    let bed_id = bed["id"].as_str().unwrap();

    let admission = json!({
        "paciente_id": patient_id,
        "leito_id": bed_id,
        "data_entrada": "2030-01-10T08:00:00Z",
        "motivo": "Observação"
    });
    let (status, body) = call(
        &app,
        Method::POST,
        "/internacoes",
        Some(&admin),
        Some(admission.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let admission_id = body["id"].as_str().unwrap().to_string();

    let (status, body) =
        call(&app, Method::POST, "/internacoes", Some(&admin), Some(admission)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Leito já está ocupado");

    let (_, beds) = call(&app, Method::GET, "/administracao/leitos", None, None).await;
    assert_eq!(beds[0]["ocupado"], true);

    let alta_uri = format!("/internacoes/{admission_id}/alta");
    let discharge = json!({ "data_alta": "2030-01-15T10:00:00Z" });
    let (status, body) = call(
        &app,
        Method::PUT,
        &alta_uri,
        Some(&admin),
        Some(discharge.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_alta"], "2030-01-15T10:00:00Z");

    let (status, _) = call(&app, Method::PUT, &alta_uri, Some(&admin), Some(discharge)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, beds) = call(&app, Method::GET, "/administracao/leitos", None, None).await;
    assert_eq!(beds[0]["ocupado"], false);
}

#[tokio::test]
async fn financial_summary_over_period() {
    let (app, _state, _mail) = app().await;
    let admin = token_for(&app, "admin@clinica.com", "Administrador").await;

    for (kind, amount, date) in [
        ("receita", 1000.0, "2024-03-05T10:00:00Z"),
        ("Despesa", 250.0, "2024-03-20T10:00:00Z"),
        ("receita", 999.0, "2024-04-02T10:00:00Z"),
    ] {
        let (status, _) = call(
            &app,
            Method::POST,
            "/administracao/financeiro",
            Some(&admin),
            Some(json!({
                "tipo": kind,
                "categoria": "geral",
                "valor": amount,
                "data_lancamento": date
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(
        &app,
        Method::GET,
        "/administracao/financeiro/resumo?inicio=2024-03-01T00:00:00Z&fim=2024-03-31T23:59:59Z",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["receita"], 1000.0);
    assert_eq!(body["despesa"], 250.0);
    assert_eq!(body["saldo"], 750.0);
    assert_eq!(body["periodo"], "01/03/2024 - 31/03/2024");

    let (status, _) = call(
        &app,
        Method::GET,
        "/administracao/financeiro/resumo?inicio=2024-03-31T00:00:00Z&fim=2024-03-01T00:00:00Z",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_patient_removes_it() {
    let (app, _state, _mail) = app().await;
    let patient_id = create_patient(&app, maria()).await;
    let uri = format!("/pacientes/{patient_id}");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("{uri}/historico"),
        None,
        Some(json!({
            "data_registro": "2024-01-01T09:00:00Z",
            "descricao": "Alergia a dipirona",
            "profissional": "Dr. Souza"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Paciente não encontrado");

    let (status, _) = call(&app, Method::GET, &format!("{uri}/historico"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patient_update_merges_fields() {
    let (app, _state, _mail) = app().await;
    let patient_id = create_patient(&app, maria()).await;

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/pacientes/{patient_id}"),
        None,
        Some(json!({ "telefone": "11888888888" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["telefone"], "11888888888");
    assert_eq!(body["nome"], "Maria");

    let (status, list) = call(
        &app,
        Method::GET,
        "/pacientes?email=maria@email.com",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn role_check_runs_before_the_body_is_parsed() {
    let (app, state, _mail) = app().await;
    let patient = token_for(&app, "paciente@email.com", "Paciente").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/internacoes",
        Some(&patient),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Acesso negado");

    let forged = token_signed_with("outro-segredo", Role::Admin, 3600);
    let bad_bed = json!({ "numero": 101 });
    let (status, body) = call(
        &app,
        Method::POST,
        "/administracao/leitos",
        Some(&forged),
        Some(bad_bed.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());

    let (status, _) = call(
        &app,
        Method::POST,
        "/administracao/leitos",
        None,
        Some(bad_bed),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let entries = state
        .audit()
        .repository()
        .list(AuditLogFilter {
            actor_email: None,
            endpoint: Some("/administracao/leitos".into()),
        })
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn malformed_body_gets_a_json_detail() {
    let (app, _state, _mail) = app().await;
    let admin = token_for(&app, "admin@clinica.com", "Administrador").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/internacoes",
        Some(&admin),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));

    let (status, body) = call(
        &app,
        Method::POST,
        "/pacientes",
        None,
        Some(json!({ "nome": "Maria" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn password_rotation_replaces_the_credential() {
    let (app, _state, _mail) = app().await;
    let token = token_for(&app, "medico@clinica.com", "Profissional").await;
    let login = |senha: &str| json!({ "email": "medico@clinica.com", "senha": senha });

    let (status, _) = call(
        &app,
        Method::PUT,
        "/usuarios/senha",
        None,
        Some(json!({ "senha_atual": "senha-forte", "nova_senha": "nova-senha-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(
        &app,
        Method::PUT,
        "/usuarios/senha",
        Some(&token),
        Some(json!({ "senha_atual": "errada-123", "nova_senha": "nova-senha-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Credenciais inválidas");

    let (status, _) = call(
        &app,
        Method::PUT,
        "/usuarios/senha",
        Some(&token),
        Some(json!({ "senha_atual": "senha-forte", "nova_senha": "curta" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = call(
        &app,
        Method::PUT,
        "/usuarios/senha",
        Some(&token),
        Some(json!({ "senha_atual": "senha-forte", "nova_senha": "nova-senha-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = call(
        &app,
        Method::POST,
        "/usuarios/login",
        None,
        Some(login("senha-forte")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(
        &app,
        Method::POST,
        "/usuarios/login",
        None,
        Some(login("nova-senha-123")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
}
