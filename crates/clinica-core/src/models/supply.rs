//! Supply (inventory item) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClinicaResult;
use crate::validation::require_text;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supply {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    /// Never negative; the type and the schema both enforce it.
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "data_validade")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSupply {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "data_validade", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateSupply {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("nome", &self.name)?;
        require_text("categoria", &self.category)
    }
}
