use anyhow::Result;
use std::fmt;
use tracing::info;

use crate::config::config::DataConfig;
use crate::data::csv_loader::{
    load_clinics_from_file, load_patients_from_file, parse_bundled, BUNDLED_CLINICS,
    BUNDLED_PRIMARY_PATIENTS, BUNDLED_SECONDARY_PATIENTS,
};
use crate::data::records::{Clinic, PatientRecord};

/// Which of the two fixed patient collections is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetId {
    /// Dataset A, shown at startup and for clinic "1"
    Primary,
    /// Dataset B, shown for any other clinic id
    Secondary,
}

impl DatasetId {
    /// Map a selector value to a dataset. Only "1" picks the primary set.
    pub fn for_selection(clinic_id: &str) -> Self {
        if clinic_id == "1" {
            DatasetId::Primary
        } else {
            DatasetId::Secondary
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetId::Primary => f.write_str("A"),
            DatasetId::Secondary => f.write_str("B"),
        }
    }
}

/// The clinics table and both patient collections, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    clinics: Vec<Clinic>,
    primary: Vec<PatientRecord>,
    secondary: Vec<PatientRecord>,
}

impl Datasets {
    pub fn new(
        clinics: Vec<Clinic>,
        primary: Vec<PatientRecord>,
        secondary: Vec<PatientRecord>,
    ) -> Self {
        Self {
            clinics,
            primary,
            secondary,
        }
    }

    /// The sources compiled into the binary
    pub fn bundled() -> Self {
        Self::new(
            parse_bundled("clinics.csv", BUNDLED_CLINICS),
            parse_bundled("patients-1.csv", BUNDLED_PRIMARY_PATIENTS),
            parse_bundled("patients-2.csv", BUNDLED_SECONDARY_PATIENTS),
        )
    }

    /// Bundled sources, with any file named in config taking their place
    pub fn load(config: &DataConfig) -> Result<Self> {
        let mut datasets = Self::bundled();

        if let Some(path) = &config.clinics_file {
            info!(target: "data", "Using clinics from {}", path.display());
            datasets.clinics = load_clinics_from_file(path)?;
        }
        if let Some(path) = &config.primary_patients_file {
            info!(target: "data", "Using dataset A from {}", path.display());
            datasets.primary = load_patients_from_file(path)?;
        }
        if let Some(path) = &config.secondary_patients_file {
            info!(target: "data", "Using dataset B from {}", path.display());
            datasets.secondary = load_patients_from_file(path)?;
        }

        info!(
            target: "data",
            "Loaded {} clinics, {} + {} patients",
            datasets.clinics.len(),
            datasets.primary.len(),
            datasets.secondary.len()
        );
        Ok(datasets)
    }

    pub fn clinics(&self) -> &[Clinic] {
        &self.clinics
    }

    pub fn records(&self, id: DatasetId) -> &[PatientRecord] {
        match id {
            DatasetId::Primary => &self.primary,
            DatasetId::Secondary => &self.secondary,
        }
    }

    /// Look up a clinic's display name by id
    pub fn clinic_name(&self, clinic_id: &str) -> Option<&str> {
        self.clinics
            .iter()
            .find(|c| c.id == clinic_id)
            .map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_selection_mapping() {
        assert_eq!(DatasetId::for_selection("1"), DatasetId::Primary);
        assert_eq!(DatasetId::for_selection("2"), DatasetId::Secondary);
        assert_eq!(DatasetId::for_selection(""), DatasetId::Secondary);
        assert_eq!(DatasetId::for_selection(" 1"), DatasetId::Secondary);
    }

    #[test]
    fn test_bundled_has_both_datasets() {
        let datasets = Datasets::bundled();
        assert!(datasets.clinics().len() >= 2);
        assert!(datasets
            .records(DatasetId::Primary)
            .iter()
            .all(|r| r.clinic_id == "1"));
        assert!(!datasets.records(DatasetId::Secondary).is_empty());
        assert_eq!(datasets.clinic_name("1"), Some("Salve Fertility"));
    }

    #[test]
    fn test_override_replaces_one_source() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id,clinic_id,first_name,last_name,date_of_birth").unwrap();
        writeln!(file, "42,2,Only,One,2000-01-01").unwrap();

        let config = DataConfig {
            secondary_patients_file: Some(file.path().to_path_buf()),
            ..DataConfig::default()
        };
        let datasets = Datasets::load(&config).unwrap();
        let secondary = datasets.records(DatasetId::Secondary);
        assert_eq!(secondary.len(), 1);
        assert_eq!(secondary[0].id, "42");
        assert_eq!(
            datasets.records(DatasetId::Primary).len(),
            Datasets::bundled().records(DatasetId::Primary).len()
        );
    }

    #[test]
    fn test_missing_override_is_error() {
        let config = DataConfig {
            clinics_file: Some("/no/such/clinics.csv".into()),
            ..DataConfig::default()
        };
        assert!(Datasets::load(&config).is_err());
    }
}
