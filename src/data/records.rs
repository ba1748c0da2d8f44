use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A clinic as listed in the selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clinic {
    pub id: String,
    pub name: String,
}

impl Clinic {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A single patient row. Every field is kept as the raw string from the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientRecord {
    pub id: String,
    pub clinic_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
}

impl PatientRecord {
    pub fn new(
        id: impl Into<String>,
        clinic_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            clinic_id: clinic_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: date_of_birth.into(),
        }
    }

    /// Get the value of a field
    pub fn field(&self, field: PatientField) -> &str {
        match field {
            PatientField::Id => &self.id,
            PatientField::ClinicId => &self.clinic_id,
            PatientField::FirstName => &self.first_name,
            PatientField::LastName => &self.last_name,
            PatientField::DateOfBirth => &self.date_of_birth,
        }
    }

    /// Values in `PatientField::ALL` order
    pub fn values(&self) -> [&str; 5] {
        PatientField::ALL.map(|f| self.field(f))
    }
}

/// The sortable columns of a patient record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientField {
    Id,
    ClinicId,
    FirstName,
    LastName,
    DateOfBirth,
}

impl PatientField {
    /// All fields in card order
    pub const ALL: [PatientField; 5] = [
        PatientField::Id,
        PatientField::ClinicId,
        PatientField::FirstName,
        PatientField::LastName,
        PatientField::DateOfBirth,
    ];

    /// Column name as it appears in the CSV header
    pub fn name(self) -> &'static str {
        match self {
            PatientField::Id => "id",
            PatientField::ClinicId => "clinic_id",
            PatientField::FirstName => "first_name",
            PatientField::LastName => "last_name",
            PatientField::DateOfBirth => "date_of_birth",
        }
    }

    /// Label shown on cards
    pub fn label(self) -> &'static str {
        match self {
            PatientField::Id => "ID",
            PatientField::ClinicId => "Clinic ID",
            PatientField::FirstName => "First name",
            PatientField::LastName => "Last name",
            PatientField::DateOfBirth => "Date of birth",
        }
    }

    pub fn index(self) -> usize {
        match self {
            PatientField::Id => 0,
            PatientField::ClinicId => 1,
            PatientField::FirstName => 2,
            PatientField::LastName => 3,
            PatientField::DateOfBirth => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Next field, wrapping from the last back to the first
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous field, wrapping from the first to the last
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for PatientField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| anyhow!("Unknown patient field '{}'", s))
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
