//! Clinica Auth — password hashing, JWT issuance/validation, the
//! role-based access guard and the audit log writer.

pub mod audit;
pub mod config;
pub mod error;
pub mod guard;
pub mod password;
pub mod service;
pub mod token;

pub use audit::AuditWriter;
pub use config::AuthConfig;
pub use error::AuthError;
pub use guard::{AccessGuard, RequestContext, authenticate, authorize};
pub use service::{AuthService, LoginInput, LoginOutput};
pub use token::AccessTokenClaims;
