//! Scheduling slot domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable (professional, timestamp) pair.
///
/// `available` is false exactly while a scheduled appointment holds the
/// slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: Uuid,
    #[serde(rename = "profissional_id")]
    pub professional_id: Uuid,
    #[serde(rename = "data_hora")]
    pub starts_at: DateTime<Utc>,
    #[serde(rename = "disponivel")]
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleSlot {
    #[serde(rename = "data_hora")]
    pub starts_at: DateTime<Utc>,
}
