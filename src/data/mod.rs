//! Data layer
//!
//! Record types, CSV loading of the clinic and patient sources,
//! and export of the displayed records.

pub mod csv_loader;
pub mod data_exporter;
pub mod datasets;
pub mod records;
