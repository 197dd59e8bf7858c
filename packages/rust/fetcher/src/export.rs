//! CSV backup of fetched leads.
//!
//! The backup is a durability side effect of the fetch stage: the primary
//! output channel is the webhook. The file uses the fixed column order from
//! [`LEAD_COLUMNS`] and is overwritten on every run.

use std::path::Path;

use tracing::debug;

use leadpipe_shared::{LEAD_COLUMNS, LeadPipeError, LeadRecord, Result};

/// Write the full lead sequence to `path` as UTF-8 CSV, overwriting any
/// existing file. The header row is written even for an empty sequence.
pub fn write_backup(path: &Path, leads: &[LeadRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| LeadPipeError::Export(format!("{}: {e}", path.display())))?;

    writer
        .write_record(LEAD_COLUMNS)
        .map_err(|e| LeadPipeError::Export(e.to_string()))?;

    for lead in leads {
        // An absent title becomes an empty cell; reading it back restores None.
        writer
            .write_record([
                lead.name.as_str(),
                lead.paper_title.as_deref().unwrap_or(""),
                lead.affiliation.as_str(),
                lead.source.as_str(),
            ])
            .map_err(|e| LeadPipeError::Export(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| LeadPipeError::io(path, e))?;

    debug!(path = %path.display(), rows = leads.len(), "lead backup written");
    Ok(())
}

/// Read a lead backup back into records (used for round-trip verification and
/// for re-driving delivery from a previous export).
pub fn read_backup(path: &Path) -> Result<Vec<LeadRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| LeadPipeError::Export(format!("{}: {e}", path.display())))?;

    let mut leads = Vec::new();
    for record in reader.deserialize() {
        let lead: LeadRecord = record.map_err(|e| LeadPipeError::Export(e.to_string()))?;
        leads.push(lead);
    }

    Ok(leads)
}
