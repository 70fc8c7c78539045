//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, balance output)
//! - `async_reader` - Asynchronous CSV reader with chunked reading interface

pub mod async_reader;
pub mod csv_format;

pub use async_reader::OperationReader;
pub use csv_format::{convert_csv_record, write_balances_csv, CsvRecord, Operation};
