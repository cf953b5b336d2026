//! CLIDATA wide-format CSV parser
//!
//! Reads GMet CLIDATA exports, where each record holds one station, one
//! element, one month and up to 31 daily values. The file is streamed record
//! by record; nothing is buffered beyond the current record.
//!
//! ## Architecture
//!
//! - [`reader`] - File handling and record streaming
//! - [`column_mapping`] - Header analysis with alias matching
//! - [`record_parser`] - Turns one CSV record into a [`ClidataRow`]
//! - [`field_parsers`] - Helpers for the individual field types
//!
//! ## Usage
//!
//! ```no_run
//! use csv::StringRecord;
//! use gmet_import::app::services::clidata_parser::{ClidataReader, parse_clidata_row};
//!
//! # fn example() -> gmet_import::Result<()> {
//! let mut reader = ClidataReader::open(std::path::Path::new("clidata.csv"))?;
//! let mut record = StringRecord::new();
//! while reader.read_record(&mut record)? {
//!     if let Ok(row) = parse_clidata_row(&record, reader.mapping()) {
//!         println!("{} {} {}-{:02}", row.station_id, row.element, row.year, row.month);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ClidataRow`]: crate::app::models::ClidataRow

pub mod column_mapping;
pub mod field_parsers;
pub mod reader;
pub mod record_parser;

#[cfg(test)]
pub mod tests;

pub use column_mapping::ColumnMapping;
pub use reader::ClidataReader;
pub use record_parser::{RowError, parse_clidata_row};
