//! Clinica Core — Domain models, error types, and the repository and
//! allocation-ledger traits shared by every crate in the workspace.

pub mod error;
pub mod ledger;
pub mod models;
pub mod repository;
pub mod validation;

pub use error::{ClinicaError, ClinicaResult};
