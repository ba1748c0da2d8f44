use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::data::datasets::{DatasetId, Datasets};
use crate::data::records::{PatientField, PatientRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self, use_glyphs: bool) -> &'static str {
        match (self, use_glyphs) {
            (SortDirection::Ascending, true) => "↑",
            (SortDirection::Descending, true) => "↓",
            (SortDirection::Ascending, false) => "^",
            (SortDirection::Descending, false) => "v",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("ascending"),
            SortDirection::Descending => f.write_str("descending"),
        }
    }
}

/// Three-way comparison of two records on one field.
///
/// Plain string ordering; numbers and dates are not interpreted.
pub fn compare_records(
    a: &PatientRecord,
    b: &PatientRecord,
    field: PatientField,
    direction: SortDirection,
) -> Ordering {
    let cmp = a.field(field).cmp(b.field(field));
    match direction {
        SortDirection::Ascending => cmp,
        SortDirection::Descending => cmp.reverse(),
    }
}

/// Stable sort of row indices into `records`
pub fn sort_rows(
    rows: &mut [usize],
    records: &[PatientRecord],
    field: PatientField,
    direction: SortDirection,
) {
    rows.sort_by(|&a, &b| compare_records(&records[a], &records[b], field, direction));
}

/// View state for the patient cards.
///
/// The displayed list is kept as the active dataset plus a permutation of
/// its row indices, so it can only ever be a reordering of one dataset.
#[derive(Debug, Clone)]
pub struct ViewController {
    datasets: Arc<Datasets>,
    direction: SortDirection,
    active: DatasetId,
    visible_rows: Vec<usize>,
    sorted_by: Option<PatientField>,
    initialized: bool,
    keep_sort_on_switch: bool,
}

impl ViewController {
    /// Mount a view. Nothing is displayed until `initialize` runs.
    pub fn new(datasets: Arc<Datasets>) -> Self {
        Self {
            datasets,
            direction: SortDirection::default(),
            active: DatasetId::Primary,
            visible_rows: Vec::new(),
            sorted_by: None,
            initialized: false,
            keep_sort_on_switch: false,
        }
    }

    /// Reapply the last sort when switching datasets
    pub fn with_sort_on_switch(mut self, keep: bool) -> Self {
        self.keep_sort_on_switch = keep;
        self
    }

    /// Show dataset A in source order. Only the first call has any effect.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            debug!(target: "view", "initialize called again, ignoring");
            return false;
        }
        self.initialized = true;
        self.show(DatasetId::Primary);
        info!(target: "view", "Initialized with {} records", self.visible_rows.len());
        true
    }

    /// Replace the display with the dataset for `clinic_id` ("1" is A, anything else B)
    pub fn select_dataset(&mut self, clinic_id: &str) -> DatasetId {
        let dataset = DatasetId::for_selection(clinic_id);
        let previous_sort = self.sorted_by.take();
        self.show(dataset);

        if self.keep_sort_on_switch {
            if let Some(field) = previous_sort {
                self.sort_visible(field, self.direction);
            }
        }

        info!(
            target: "view",
            "Clinic '{}' selected, showing dataset {} ({} records)",
            clinic_id,
            dataset,
            self.visible_rows.len()
        );
        dataset
    }

    /// Flip the direction, then sort the display by `field` in the new direction
    pub fn handle_column_click(&mut self, field: PatientField) -> SortDirection {
        self.direction = self.direction.toggled();
        self.sort_visible(field, self.direction);
        debug!(
            target: "view",
            "Sorted {} records by {} {}",
            self.visible_rows.len(),
            field,
            self.direction
        );
        self.direction
    }

    fn show(&mut self, dataset: DatasetId) {
        self.active = dataset;
        self.visible_rows = (0..self.datasets.records(dataset).len()).collect();
    }

    fn sort_visible(&mut self, field: PatientField, direction: SortDirection) {
        let records = self.datasets.records(self.active);
        sort_rows(&mut self.visible_rows, records, field, direction);
        self.sorted_by = Some(field);
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn active_dataset(&self) -> DatasetId {
        self.active
    }

    /// Field of the most recent sort on the current display, if any
    pub fn sorted_by(&self) -> Option<PatientField> {
        self.sorted_by
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    pub fn len(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_rows.is_empty()
    }

    /// Row indices into the active dataset, in display order
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }

    pub fn get_record(&self, index: usize) -> Option<&PatientRecord> {
        let row = *self.visible_rows.get(index)?;
        self.datasets.records(self.active).get(row)
    }

    /// Records in display order
    pub fn displayed_records(&self) -> Vec<&PatientRecord> {
        let records = self.datasets.records(self.active);
        self.visible_rows.iter().map(|&row| &records[row]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, first: &str) -> PatientRecord {
        PatientRecord::new(id, "1", first, "Doe", "1990-01-01")
    }

    fn ids(view: &ViewController) -> Vec<&str> {
        view.displayed_records()
            .into_iter()
            .map(|r| r.id.as_str())
            .collect()
    }

    fn view_of(primary: Vec<PatientRecord>, secondary: Vec<PatientRecord>) -> ViewController {
        ViewController::new(Arc::new(Datasets::new(Vec::new(), primary, secondary)))
    }

    #[test]
    fn test_nothing_shown_before_initialize() {
        let view = view_of(vec![record("1", "A")], Vec::new());
        assert!(view.is_empty());
        assert!(!view.is_initialized());
    }

    #[test]
    fn test_initialize_runs_once() {
        let mut view = view_of(vec![record("2", "B"), record("1", "A")], Vec::new());
        assert!(view.initialize());
        view.handle_column_click(PatientField::Id);
        assert!(!view.initialize());
        // second initialize must not undo the sort
        assert_eq!(ids(&view), vec!["2", "1"]);
        assert_eq!(view.direction(), SortDirection::Descending);
    }

    #[test]
    fn test_toggle_before_sort() {
        let mut view = view_of(vec![record("2", "B"), record("1", "A")], Vec::new());
        view.initialize();

        assert_eq!(view.handle_column_click(PatientField::Id), SortDirection::Descending);
        assert_eq!(ids(&view), vec!["2", "1"]);

        assert_eq!(view.handle_column_click(PatientField::Id), SortDirection::Ascending);
        assert_eq!(ids(&view), vec!["1", "2"]);
    }

    #[test]
    fn test_direction_shared_across_fields() {
        let mut view = view_of(
            vec![record("1", "Cy"), record("2", "Al"), record("3", "Bo")],
            Vec::new(),
        );
        view.initialize();
        view.handle_column_click(PatientField::Id);
        // direction is now descending, so this click sorts ascending
        view.handle_column_click(PatientField::FirstName);
        assert_eq!(ids(&view), vec!["2", "3", "1"]);
        assert_eq!(view.sorted_by(), Some(PatientField::FirstName));
    }

    #[test]
    fn test_lexicographic_not_numeric() {
        let mut view = view_of(
            vec![record("9", "x"), record("10", "y"), record("2", "z")],
            Vec::new(),
        );
        view.initialize();
        view.handle_column_click(PatientField::Id);
        view.handle_column_click(PatientField::Id);
        assert_eq!(ids(&view), vec!["10", "2", "9"]);
    }

    #[test]
    fn test_ties_keep_relative_order() {
        let mut view = view_of(
            vec![record("1", "Same"), record("2", "Same"), record("3", "Same")],
            Vec::new(),
        );
        view.initialize();
        view.handle_column_click(PatientField::FirstName);
        assert_eq!(ids(&view), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_select_resets_order_but_not_direction() {
        let mut view = view_of(
            vec![record("2", "B"), record("1", "A")],
            vec![record("5", "E"), record("4", "D")],
        );
        view.initialize();
        view.handle_column_click(PatientField::Id);
        view.handle_column_click(PatientField::Id);
        assert_eq!(ids(&view), vec!["1", "2"]);

        assert_eq!(view.select_dataset("2"), DatasetId::Secondary);
        assert_eq!(ids(&view), vec!["5", "4"]);
        assert_eq!(view.sorted_by(), None);
        assert_eq!(view.direction(), SortDirection::Ascending);

        assert_eq!(view.select_dataset("1"), DatasetId::Primary);
        assert_eq!(ids(&view), vec!["2", "1"]);
    }

    #[test]
    fn test_keep_sort_on_switch() {
        let datasets = Datasets::new(
            Vec::new(),
            vec![record("2", "B"), record("1", "A")],
            vec![record("4", "D"), record("6", "F"), record("5", "E")],
        );
        let mut view = ViewController::new(Arc::new(datasets)).with_sort_on_switch(true);
        view.initialize();
        view.handle_column_click(PatientField::Id);
        view.select_dataset("7");
        assert_eq!(ids(&view), vec!["6", "5", "4"]);
        assert_eq!(view.sorted_by(), Some(PatientField::Id));
    }

    #[test]
    fn test_empty_dataset_click() {
        let mut view = view_of(Vec::new(), Vec::new());
        view.initialize();
        assert_eq!(view.handle_column_click(PatientField::LastName), SortDirection::Descending);
        assert!(view.is_empty());
        assert!(view.get_record(0).is_none());
    }

    #[test]
    fn test_compare_records() {
        let a = record("1", "Al");
        let b = record("2", "Bo");
        assert_eq!(
            compare_records(&a, &b, PatientField::FirstName, SortDirection::Ascending),
            Ordering::Less
        );
        assert_eq!(
            compare_records(&a, &b, PatientField::FirstName, SortDirection::Descending),
            Ordering::Greater
        );
        assert_eq!(
            compare_records(&a, &a, PatientField::FirstName, SortDirection::Descending),
            Ordering::Equal
        );
    }
}
