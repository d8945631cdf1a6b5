//! Domain models for Clinica.
//!
//! Field names are English in Rust; the serde names follow the public
//! JSON API, which is in Portuguese.

pub mod admission;
pub mod appointment;
pub mod audit;
pub mod bed;
pub mod clinical_note;
pub mod finance;
pub mod patient;
pub mod prescription;
pub mod professional;
pub mod schedule;
pub mod supply;
pub mod telemedicine;
pub mod user;
