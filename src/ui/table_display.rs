use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::data::records::{PatientField, PatientRecord};
use crate::view::controller::ViewController;

/// Build a table of the records, one row per card
pub fn records_table(records: &[&PatientRecord]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        PatientField::ALL
            .into_iter()
            .map(|f| Cell::new(f.label()).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for record in records {
        table.add_row(record.values());
    }
    table
}

/// Print what the view currently shows
pub fn display_view(view: &ViewController) {
    let records = view.displayed_records();
    if records.is_empty() {
        println!("{}", "No patients to show.".yellow());
        return;
    }

    println!("{}", records_table(&records));

    let sort = match view.sorted_by() {
        Some(field) => format!(", sorted by {} ({})", field.label(), view.direction()),
        None => String::new(),
    };
    println!(
        "\n{}",
        format!(
            "{} patients from dataset {}{}",
            records.len(),
            view.active_dataset(),
            sort
        )
        .green()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_a_row_per_record() {
        let a = PatientRecord::new("1", "1", "Linnell", "Rentilll", "1978-05-21");
        let b = PatientRecord::new("2", "1", "Hillary", "Raynes", "1993-09-01");
        let table = records_table(&[&a, &b]);
        assert_eq!(table.row_iter().count(), 2);

        let text = table.to_string();
        assert!(text.contains("Date of birth"));
        assert!(text.contains("Raynes"));
    }
}
