//! Commands sent to the view and the changes they produce

use anyhow::Result;

use crate::data::datasets::DatasetId;
use crate::data::records::PatientField;
use crate::view::controller::SortDirection;

/// User intents the view reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    /// First render
    Initialize,

    /// A value was chosen in the clinic selector
    SelectDataset(String),

    /// A field on a card was clicked
    ColumnClick(PatientField),
}

impl ViewCommand {
    pub fn select(clinic_id: impl Into<String>) -> Self {
        ViewCommand::SelectDataset(clinic_id.into())
    }

    /// Build a click from a field name such as `last_name`
    pub fn column_click(field_name: &str) -> Result<Self> {
        Ok(ViewCommand::ColumnClick(field_name.parse()?))
    }
}

/// What a dispatched command did to the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    Initialized {
        records: usize,
    },
    DatasetSelected {
        dataset: DatasetId,
        records: usize,
    },
    Sorted {
        field: PatientField,
        direction: SortDirection,
    },
    Unchanged,
}

impl ViewChange {
    /// One-line description for the status bar
    pub fn describe(&self) -> String {
        match self {
            ViewChange::Initialized { records } => format!("Loaded {} patients", records),
            ViewChange::DatasetSelected { dataset, records } => {
                format!("Showing dataset {} ({} patients)", dataset, records)
            }
            ViewChange::Sorted { field, direction } => {
                format!("Sorted by {} ({})", field.label(), direction)
            }
            ViewChange::Unchanged => "Nothing to do".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_click_parsing() {
        assert_eq!(
            ViewCommand::column_click("date_of_birth").unwrap(),
            ViewCommand::ColumnClick(PatientField::DateOfBirth)
        );
        assert!(ViewCommand::column_click("dob").is_err());
    }

    #[test]
    fn test_describe() {
        let change = ViewChange::Sorted {
            field: PatientField::LastName,
            direction: SortDirection::Descending,
        };
        assert_eq!(change.describe(), "Sorted by Last name (descending)");
    }
}
