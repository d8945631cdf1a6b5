//! Bed domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClinicaResult;
use crate::validation::require_text;

/// A physical inpatient bed. `occupied` is true iff exactly one open
/// admission references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
    pub id: Uuid,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "ocupado")]
    pub occupied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBed {
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "unidade")]
    pub unit: String,
}

impl CreateBed {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("numero", &self.number)?;
        require_text("tipo", &self.kind)?;
        require_text("unidade", &self.unit)
    }
}
