//! Request extractors.
//!
//! Role checks run here, as `FromRequestParts` extractors, so they are
//! resolved before any body extractor: a caller without the right token
//! gets 401/403 whatever the body looks like.

use std::convert::Infallible;
use std::marker::PhantomData;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clinica_auth::{AccessTokenClaims, RequestContext, authenticate};
use clinica_core::models::user::Role;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::state::SharedState;

fn request_context(parts: &Parts) -> RequestContext {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(RequestContext::parse_bearer);

    RequestContext {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        bearer,
    }
}

/// Method, path and bearer token of the current request.
///
/// Never rejects: a missing or malformed `Authorization` header yields
/// `bearer: None`.
pub struct Context(pub RequestContext);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Context {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Context(request_context(parts)))
    }
}

/// Role a guarded route requires.
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: Role;
}

pub struct Admin;
pub struct Professional;
pub struct Patient;

impl RequiredRole for Admin {
    const ROLE: Role = Role::Admin;
}

impl RequiredRole for Professional {
    const ROLE: Role = Role::Professional;
}

impl RequiredRole for Patient {
    const ROLE: Role = Role::Patient;
}

/// A request admitted by the access guard for role `R`.
///
/// Extraction audits the permitted access; a failed check rejects with
/// 401 or 403 and writes nothing.
pub struct Admitted<R: RequiredRole> {
    pub claims: AccessTokenClaims,
    pub context: RequestContext,
    role: PhantomData<R>,
}

#[axum::async_trait]
impl<R: RequiredRole> FromRequestParts<SharedState> for Admitted<R> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let context = request_context(parts);
        let claims = state.guard.admit(R::ROLE, &context).await?;
        Ok(Self {
            claims,
            context,
            role: PhantomData,
        })
    }
}

/// Any caller holding a valid token, whatever its role.
pub struct Authenticated {
    pub claims: AccessTokenClaims,
    pub context: RequestContext,
}

#[axum::async_trait]
impl FromRequestParts<SharedState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let context = request_context(parts);
        let claims = authenticate(context.bearer.as_deref(), &state.auth)?;
        Ok(Self { claims, context })
    }
}

/// JSON body whose rejection uses the API's `{"detail": ..}` shape.
pub struct Payload<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Payload(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}
