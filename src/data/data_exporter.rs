use anyhow::{anyhow, Result};
use chrono::Local;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::records::{PatientField, PatientRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// `.json` files get JSON, everything else CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Writes the displayed records out in display order
pub struct DataExporter;

impl DataExporter {
    /// Write records as CSV with a header of field names
    pub fn write_csv<W: Write>(records: &[&PatientRecord], writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(PatientField::ALL.map(PatientField::name))?;
        for record in records {
            wtr.write_record(record.values())?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write records as a pretty JSON array of objects
    pub fn write_json<W: Write>(records: &[&PatientRecord], mut writer: W) -> Result<()> {
        let rows: Vec<Value> = records
            .iter()
            .map(|record| {
                let mut row = Map::new();
                for field in PatientField::ALL {
                    row.insert(
                        field.name().to_string(),
                        Value::String(record.field(field).to_string()),
                    );
                }
                Value::Object(row)
            })
            .collect();
        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Export to a file, picking the format from its extension
    pub fn export_to_file(records: &[&PatientRecord], path: &Path) -> Result<String> {
        if records.is_empty() {
            return Err(anyhow!("No records to export"));
        }

        let file = File::create(path)?;
        match ExportFormat::from_path(path) {
            ExportFormat::Csv => Self::write_csv(records, file)?,
            ExportFormat::Json => Self::write_json(records, file)?,
        }

        Ok(format!(
            "Exported {} records to {}",
            records.len(),
            path.display()
        ))
    }

    /// Export to a timestamped CSV inside `dir`
    pub fn export_timestamped_csv(records: &[&PatientRecord], dir: &Path) -> Result<String> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("patients_{}.csv", timestamp));
        Self::export_to_file(records, &path)
    }
}
