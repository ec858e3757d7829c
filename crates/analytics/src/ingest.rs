//! Roster ingest: interpret an upload-service response and fill defaults.
//!
//! Rows are never rejected individually. An upload with no rows at all is.

use chrono::NaiveDate;
use serde_json::Value;
use trustlens_core::{ClientRecord, Roster, Scalar};

/// Status given to rows uploaded without one.
pub const DEFAULT_STATUS: &str = "Pending";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("No data was processed from the upload")]
    EmptyRoster,

    #[error("Invalid upload payload: {0}")]
    InvalidPayload(String),
}

/// What the upload collaborator handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The workbook is encrypted; ask the user for its password.
    PasswordRequired { message: Option<String> },
    Rows(Roster),
}

/// Interpret an upload response body.
///
/// Accepts a bare JSON array of rows, `{"data": [...]}`, or the
/// password-required signal `{"requiresPassword": true, "error": "..."}`.
pub fn parse_upload(body: Value) -> Result<UploadOutcome, IngestError> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Object(mut map) => {
            if map.get("requiresPassword").and_then(Value::as_bool) == Some(true) {
                let message = map.get("error").and_then(Value::as_str).map(String::from);
                return Ok(UploadOutcome::PasswordRequired { message });
            }
            match map.remove("data") {
                Some(Value::Array(rows)) => rows,
                _ => {
                    let reason = map
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("expected a \"data\" array");
                    return Err(IngestError::InvalidPayload(reason.to_string()));
                }
            }
        }
        other => {
            return Err(IngestError::InvalidPayload(format!(
                "expected an array or object, got {}",
                json_kind(&other)
            )));
        }
    };

    let roster = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| match serde_json::from_value::<ClientRecord>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                // Only non-object rows land here; cell types never fail.
                tracing::warn!(row = i, error = %e, "Skipping row that is not an object");
                None
            }
        })
        .collect();
    Ok(UploadOutcome::Rows(roster))
}

/// Fill in upload defaults: a missing status becomes `Pending` and a missing
/// commencement date becomes `today`.
pub fn normalize(rows: Roster, today: NaiveDate) -> Result<Roster, IngestError> {
    if rows.is_empty() {
        return Err(IngestError::EmptyRoster);
    }
    let today = today.format("%Y-%m-%d").to_string();
    Ok(rows
        .into_iter()
        .map(|mut record| {
            if is_blank(record.status.as_ref()) {
                record.status = Some(Scalar::from(DEFAULT_STATUS));
            }
            if is_blank(record.commenced_date.as_ref()) {
                record.commenced_date = Some(Scalar::from(today.as_str()));
            }
            record
        })
        .collect())
}

fn is_blank(cell: Option<&Scalar>) -> bool {
    match cell {
        None => true,
        Some(Scalar::Text(s)) => s.is_empty(),
        Some(Scalar::Number(n)) => *n == 0.0,
        Some(Scalar::Flag(b)) => !b,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
