use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::data::records::{Clinic, PatientRecord};

pub(crate) const BUNDLED_CLINICS: &str = include_str!("../../data/clinics.csv");
pub(crate) const BUNDLED_PRIMARY_PATIENTS: &str = include_str!("../../data/patients-1.csv");
pub(crate) const BUNDLED_SECONDARY_PATIENTS: &str = include_str!("../../data/patients-2.csv");

/// Read header-keyed CSV rows into records.
///
/// Values are trimmed, short rows leave the missing fields empty and columns
/// the record type doesn't know about are ignored.
pub fn read_records<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().context("Cannot read CSV header")?.clone();

    let mut records = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let mut row = result.with_context(|| format!("Malformed CSV row {}", line + 1))?;
        // Line rows up with the header: pad short ones, drop unnamed extras
        while row.len() < headers.len() {
            row.push_field("");
        }
        row.truncate(headers.len());

        let record = row
            .deserialize(Some(&headers))
            .with_context(|| format!("Malformed CSV row {}", line + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_clinics_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Clinic>> {
    load_from_file(path.as_ref())
}

pub fn load_patients_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<PatientRecord>> {
    load_from_file(path.as_ref())
}

fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let records =
        read_records(file).with_context(|| format!("Cannot parse {}", path.display()))?;
    debug!(target: "data", "Loaded {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Parse a compiled-in source. A broken bundle shows up as an empty collection.
pub(crate) fn parse_bundled<T: DeserializeOwned>(name: &str, source: &str) -> Vec<T> {
    match read_records(source.as_bytes()) {
        Ok(records) => {
            debug!(target: "data", "Bundled {} has {} rows", name, records.len());
            records
        }
        Err(e) => {
            warn!(target: "data", "Bundled {} could not be parsed, showing nothing: {:#}", name, e);
            Vec::new()
        }
    }
}
