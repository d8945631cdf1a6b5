//! Field-level input checks shared by the `Create*` models.

use crate::error::{ClinicaError, ClinicaResult};

/// Reject empty or whitespace-only text fields.
pub fn require_text(field: &str, value: &str) -> ClinicaResult<()> {
    if value.trim().is_empty() {
        return Err(ClinicaError::validation(format!(
            "campo '{field}' é obrigatório"
        )));
    }
    Ok(())
}

/// Minimal structural email check: one `@`, non-empty local part, and a
/// dotted domain without whitespace.
pub fn require_email(value: &str) -> ClinicaResult<()> {
    let invalid = || ClinicaError::validation(format!("email inválido: {value}"));

    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(invalid());
    };
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}
