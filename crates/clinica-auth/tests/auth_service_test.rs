//! Integration tests for AuthService and AccessGuard using in-memory
//! SurrealDB.

use std::sync::Arc;

use clinica_auth::token::decode_access_token;
use clinica_auth::{
    AccessGuard, AuditWriter, AuthConfig, AuthError, AuthService, LoginInput, RequestContext,
};
use clinica_core::error::ClinicaError;
use clinica_core::models::user::{CreateUser, Role};
use clinica_core::repository::{AuditLogFilter, AuditLogRepository};
use clinica_db::repository::{SurrealAuditLogRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-secret".into(),
        pepper: Some("pimenta".into()),
        ..Default::default()
    }
}

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    clinica_db::run_migrations(&db).await.unwrap();
    db
}

fn admin() -> CreateUser {
    CreateUser {
        name: "Admin".into(),
        email: "admin@clinica.com".into(),
        password: "senha-forte".into(),
        role: Role::Admin,
    }
}

#[tokio::test]
async fn register_then_login_issues_token_with_role() {
    let db = setup().await;
    let service = AuthService::new(SurrealUserRepository::new(db), test_config());

    let user = service.register(admin()).await.unwrap();
    assert_ne!(user.password_hash, "senha-forte");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let output = service
        .login(LoginInput {
            email: "admin@clinica.com".into(),
            password: "senha-forte".into(),
        })
        .await
        .unwrap();
    assert_eq!(output.token_type, "bearer");

    let claims = decode_access_token(&output.access_token, &test_config()).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.role, Role::Admin);
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let db = setup().await;
    let service = AuthService::new(SurrealUserRepository::new(db), test_config());

    service.register(admin()).await.unwrap();
    let err = service.register(admin()).await.unwrap_err();
    assert!(matches!(err, ClinicaError::Conflict { .. }));
}

#[tokio::test]
async fn short_password_is_rejected() {
    let db = setup().await;
    let service = AuthService::new(SurrealUserRepository::new(db), test_config());

    let err = service
        .register(CreateUser {
            password: "curta".into(),
            ..admin()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClinicaError::Validation { .. }));
}

#[tokio::test]
async fn bad_credentials_are_unauthenticated() {
    let db = setup().await;
    let service = AuthService::new(SurrealUserRepository::new(db), test_config());
    service.register(admin()).await.unwrap();

    let wrong_password = service
        .login(LoginInput {
            email: "admin@clinica.com".into(),
            password: "senha-errada".into(),
        })
        .await
        .unwrap_err();
    let unknown_email = service
        .login(LoginInput {
            email: "ninguem@clinica.com".into(),
            password: "senha-forte".into(),
        })
        .await
        .unwrap_err();

    for err in [wrong_password, unknown_email] {
        match err {
            ClinicaError::Unauthenticated { reason } => {
                assert_eq!(reason, "Credenciais inválidas")
            }
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn rotate_password_replaces_credential() {
    let db = setup().await;
    let service = AuthService::new(SurrealUserRepository::new(db), test_config());
    let user = service.register(admin()).await.unwrap();

    let err = service
        .rotate_password(user.id, "senha-errada", "nova-senha-123")
        .await
        .unwrap_err();
    assert!(matches!(err, ClinicaError::Unauthenticated { .. }));

    service
        .rotate_password(user.id, "senha-forte", "nova-senha-123")
        .await
        .unwrap();

    assert!(
        service
            .login(LoginInput {
                email: "admin@clinica.com".into(),
                password: "senha-forte".into(),
            })
            .await
            .is_err()
    );
    service
        .login(LoginInput {
            email: "admin@clinica.com".into(),
            password: "nova-senha-123".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn guard_audits_only_permitted_requests() {
    let db = setup().await;
    let config = test_config();
    let service = AuthService::new(SurrealUserRepository::new(db.clone()), config.clone());
    let audit_repo = SurrealAuditLogRepository::new(db.clone());
    let guard = AccessGuard::new(Arc::new(config), AuditWriter::new(audit_repo.clone()));

    service.register(admin()).await.unwrap();
    service
        .register(CreateUser {
            name: "Paciente".into(),
            email: "paciente@clinica.com".into(),
            password: "senha-forte".into(),
            role: Role::Patient,
        })
        .await
        .unwrap();

    let token_of = |email: &'static str| {
        let service = &service;
        async move {
            service
                .login(LoginInput {
                    email: email.into(),
                    password: "senha-forte".into(),
                })
                .await
                .unwrap()
                .access_token
        }
    };
    let ctx = |token: Option<String>| RequestContext {
        method: "POST".into(),
        path: "/internacoes".into(),
        bearer: token,
    };

    let patient_token = token_of("paciente@clinica.com").await;
    let err = guard
        .admit(Role::Admin, &ctx(Some(patient_token)))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden));

    let err = guard.admit(Role::Admin, &ctx(None)).await.unwrap_err();
    assert!(matches!(err, AuthError::MissingToken));
    assert!(audit_repo.list(AuditLogFilter::default()).await.unwrap().is_empty());

    let admin_token = token_of("admin@clinica.com").await;
    guard
        .admit(Role::Admin, &ctx(Some(admin_token)))
        .await
        .unwrap();

    let entries = audit_repo.list(AuditLogFilter::default()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actor_email.as_deref(), Some("admin@clinica.com"));
    assert_eq!(entries[0].endpoint, "/internacoes");
}
