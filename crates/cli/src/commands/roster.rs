//! `trustlens load` and `trustlens clear`: roster management.

use std::path::Path;
use trustlens_analytics::UploadOutcome;

use super::runtime;

pub fn load(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let body: serde_json::Value = serde_json::from_str(&content)?;

    match runtime.ingest(body)? {
        UploadOutcome::Rows(roster) => {
            println!("📥 Loaded {} clients from {}", roster.len(), file.display());
        }
        UploadOutcome::PasswordRequired { message } => {
            println!("🔒 The workbook is password protected.");
            if let Some(message) = message {
                println!("   {message}");
            }
            println!("   Decrypt it with the upload service and load the response again.");
        }
    }

    Ok(())
}

pub fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime()?;
    runtime.clear_roster()?;
    println!("🗑️  Cleared the roster and its chart narratives.");
    Ok(())
}
