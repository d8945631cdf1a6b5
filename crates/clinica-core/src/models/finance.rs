//! Financial ledger entries and the period summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClinicaError, ClinicaResult};
use crate::validation::require_text;

pub const KIND_REVENUE: &str = "receita";
pub const KIND_EXPENSE: &str = "despesa";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialEntry {
    pub id: Uuid,
    /// `receita` or `despesa` (case-insensitive); other kinds are stored
    /// but ignored by the summary.
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "data_lancamento")]
    pub entry_date: DateTime<Utc>,
    #[serde(rename = "unidade")]
    pub unit: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFinancialEntry {
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "data_lancamento")]
    pub entry_date: DateTime<Utc>,
    #[serde(rename = "unidade", default)]
    pub unit: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
}

impl CreateFinancialEntry {
    pub fn validate(&self) -> ClinicaResult<()> {
        require_text("tipo", &self.kind)?;
        require_text("categoria", &self.category)?;
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ClinicaError::validation(
                "valor deve ser um número não negativo",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    #[serde(rename = "receita")]
    pub revenue: f64,
    #[serde(rename = "despesa")]
    pub expense: f64,
    #[serde(rename = "saldo")]
    pub balance: f64,
    /// `dd/mm/YYYY - dd/mm/YYYY`.
    #[serde(rename = "periodo")]
    pub period: String,
}

/// Reject inverted periods before anything is queried.
pub fn ensure_period(from: DateTime<Utc>, to: DateTime<Utc>) -> ClinicaResult<()> {
    if from > to {
        return Err(ClinicaError::validation(
            "inicio deve ser anterior ou igual a fim",
        ));
    }
    Ok(())
}

/// Sum revenue and expense over `entries` whose date lies in
/// `[from, to]` (both ends inclusive).
pub fn summarize(
    entries: &[FinancialEntry],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> ClinicaResult<FinancialSummary> {
    ensure_period(from, to)?;

    let (mut revenue, mut expense) = (0.0, 0.0);
    for entry in entries
        .iter()
        .filter(|e| e.entry_date >= from && e.entry_date <= to)
    {
        if entry.kind.eq_ignore_ascii_case(KIND_REVENUE) {
            revenue += entry.amount;
        } else if entry.kind.eq_ignore_ascii_case(KIND_EXPENSE) {
            expense += entry.amount;
        }
    }

    Ok(FinancialSummary {
        revenue,
        expense,
        balance: revenue - expense,
        period: format!("{} - {}", from.format("%d/%m/%Y"), to.format("%d/%m/%Y")),
    })
}
