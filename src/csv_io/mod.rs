mod csv_export;
mod csv_import;

pub use csv_export::{export_to_path, export_to_string, write_expenses};
pub use csv_import::CsvImporter;
